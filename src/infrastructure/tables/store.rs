//! Shared handle to the active pricing tables

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use super::file::{TablesFile, TablesFileError};
use crate::domain::pricing::PricingTables;

/// Holds the active tables snapshot and where it was loaded from.
///
/// Readers take a cheap `Arc` snapshot per request; a reload swaps the whole
/// snapshot atomically, so an in-flight quote always sees one consistent
/// set of tables.
#[derive(Debug)]
pub struct TableStore {
    current: ArcSwap<PricingTables>,
    source: Option<PathBuf>,
}

impl TableStore {
    pub fn new(tables: PricingTables) -> Self {
        Self {
            current: ArcSwap::from_pointee(tables),
            source: None,
        }
    }

    pub fn standard() -> Self {
        Self::new(PricingTables::standard())
    }

    /// Load from `path`, or fall back to the built-in tables when `None`.
    pub fn open(path: Option<&Path>) -> Result<Self, TablesFileError> {
        match path {
            Some(path) => {
                let tables = TablesFile::load(path)?;
                info!(
                    "Pricing tables {} loaded from {}",
                    tables.version,
                    path.display()
                );
                Ok(Self {
                    current: ArcSwap::from_pointee(tables),
                    source: Some(path.to_path_buf()),
                })
            }
            None => {
                info!("Using built-in pricing tables");
                Ok(Self::standard())
            }
        }
    }

    pub fn current(&self) -> Arc<PricingTables> {
        self.current.load_full()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn replace(&self, tables: PricingTables) {
        self.current.store(Arc::new(tables));
    }

    /// Re-read the source file and swap it in. On failure the previous
    /// tables stay active. Built-in tables have nothing to reload.
    pub fn reload(&self) -> Result<Arc<PricingTables>, TablesFileError> {
        if let Some(path) = &self.source {
            let tables = TablesFile::load(path)?;
            self.replace(tables);
        }
        Ok(self.current())
    }
}
