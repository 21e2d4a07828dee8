//! In-memory [`BoneCatalog`] implementation for tests and small embedded
//! catalogs.
//!
//! Rows live in a `Vec` behind `std::sync::RwLock`. Lookups are linear
//! scans, which is fine for catalogs of a few hundred rows.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::BoneCatalogEntry;

use super::BoneCatalog;

/// In-memory bone catalog.
pub struct InMemoryCatalog {
    rows: RwLock<Vec<BoneCatalogEntry>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn from_entries(entries: Vec<BoneCatalogEntry>) -> Self {
        Self {
            rows: RwLock::new(entries),
        }
    }

    pub fn insert(&self, entry: BoneCatalogEntry) {
        self.rows.write().unwrap().push(entry);
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all rows in insertion order.
    pub fn entries(&self) -> Vec<BoneCatalogEntry> {
        self.rows.read().unwrap().clone()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn names(entry: &BoneCatalogEntry) -> impl Iterator<Item = &str> {
    entry
        .mesh_name
        .as_deref()
        .into_iter()
        .chain(std::iter::once(entry.en_name.as_str()))
        .filter(|n| !n.is_empty())
}

#[async_trait]
impl BoneCatalog for InMemoryCatalog {
    async fn exact_match(&self, name: &str) -> Result<Option<BoneCatalogEntry>> {
        if name.is_empty() {
            return Ok(None);
        }
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|e| names(e).any(|n| n.eq_ignore_ascii_case(name)))
            .cloned())
    }

    async fn prefix_match(&self, prefix: &str) -> Result<Vec<BoneCatalogEntry>> {
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let prefix_lower = prefix.to_ascii_lowercase();
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|e| names(e).any(|n| n.to_ascii_lowercase().starts_with(&prefix_lower)))
            .cloned()
            .collect())
    }
}
