pub mod pricing;

// Re-export commonly used types
pub use pricing::{Breakdown, PricingEngine, PricingError, PricingRequest, PricingTables};
