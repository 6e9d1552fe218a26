//! # HMS Billing
//!
//! Pricing service for a hospital management system: ambulance dispatch
//! quotes and GST computation for invoice lines, both with insurance
//! coverage, built on one rate-table driven engine.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Pricing engine, catalogs, rate tables and breakdowns
//! - **application**: Billing service (table snapshots, logging, metrics)
//! - **infrastructure**: Tables file loading and hot-reloadable table store
//! - **interfaces**: REST API with Swagger documentation
//! - **support**: Errors and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig};

pub use domain::{Breakdown, PricingEngine, PricingError, PricingRequest, PricingTables};

pub use application::BillingService;

pub use interfaces::http::create_api_router;
