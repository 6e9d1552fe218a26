//! Infrastructure layer - external concerns

pub mod tables;

pub use tables::{TableStore, TablesFile, TablesFileError};
