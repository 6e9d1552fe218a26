//! Application layer - services orchestrating the pricing domain

pub mod services;

pub use services::BillingService;
