//! Hospital invoice GST computation

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
