//! Pricing tables storage

mod file;
mod store;

pub use file::{AmbulanceTaxSection, RateSection, TablesFile, TablesFileError};
pub use store::TableStore;
