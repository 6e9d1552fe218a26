pub mod ambulance;
pub mod health;
pub mod invoices;
pub mod metrics;
pub mod pricing;
pub mod request_id;
