//! Table registry
//!
//! The fixed set of named hashtables, built once from configuration.
//! Operations resolve a namespace here and never hold a registry-wide lock;
//! all locking lives inside the individual tables.

use crate::config::Config;
use crate::error::{Result, StoreError};

use super::HashTable;

/// Per-table result of an eager load
#[derive(Debug, Clone)]
pub struct TableLoad {
    pub name: String,
    pub entries: usize,
}

/// Owns every configured [`HashTable`]. Membership never changes after
/// construction; tables come and go only in memory, via load and unload.
pub struct TableRegistry {
    tables: Vec<HashTable>,
}

impl TableRegistry {
    /// Build the registry from configuration, in configuration order.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let tables = config
            .tables
            .iter()
            .map(|spec| {
                HashTable::new(
                    spec.name.clone(),
                    config.source_path(spec),
                    spec.algorithm,
                    config.sync_strategy,
                )
            })
            .collect();
        Ok(Self { tables })
    }

    /// Resolve a namespace name to its table.
    pub fn get(&self, name: &str) -> Result<&HashTable> {
        self.tables
            .iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    /// Clear every table, one at a time. In-flight operations on a table
    /// finish before its clear takes effect; tables not yet swept can still
    /// serve from their old contents meanwhile.
    pub fn unload_all(&self) {
        for table in &self.tables {
            table.clear();
        }
    }

    /// Eagerly load every table. Stops at the first failure.
    pub fn load_all(&self) -> Result<Vec<TableLoad>> {
        let mut loads = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let entries = table.ensure_loaded()?;
            loads.push(TableLoad {
                name: table.name().to_string(),
                entries,
            });
        }
        Ok(loads)
    }

    /// All configured tables, in configuration order.
    pub fn tables(&self) -> &[HashTable] {
        &self.tables
    }
}
