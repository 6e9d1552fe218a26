//! HTTP REST API interfaces
//!
//! - `common`: response envelope, JSON extractor and shared state
//! - `modules`: one module per resource (ambulance, invoices, pricing, health, metrics)
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
