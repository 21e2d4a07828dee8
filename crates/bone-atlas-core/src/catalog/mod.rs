//! Bone catalog abstraction.
//!
//! The [`BoneCatalog`] trait is the only way the resolution pipeline reads
//! canonical bone records. Hosts back it with a database; tests use
//! [`memory::InMemoryCatalog`].
//!
//! Implementations must be `Send + Sync` and must not mutate shared state
//! when queried, so one catalog can serve concurrent requests.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::BoneCatalogEntry;

/// Read-only bone catalog lookup.
///
/// Both lookups are case-insensitive and consider a row's mesh name and
/// English name. Operations are async (via `async-trait`) so hosts can use
/// pooled database connections; in-memory implementations return
/// immediately-ready futures.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`exact_match`](BoneCatalog::exact_match) | Row whose name equals `name` |
/// | [`prefix_match`](BoneCatalog::prefix_match) | Rows whose name starts with `prefix` |
#[async_trait]
pub trait BoneCatalog: Send + Sync {
    /// Find the row whose mesh or English name equals `name`, ignoring case.
    async fn exact_match(&self, name: &str) -> Result<Option<BoneCatalogEntry>>;

    /// Find all rows whose mesh or English name starts with `prefix`,
    /// ignoring case. Order is unspecified.
    async fn prefix_match(&self, prefix: &str) -> Result<Vec<BoneCatalogEntry>>;
}

#[async_trait]
impl<T: BoneCatalog + ?Sized> BoneCatalog for std::sync::Arc<T> {
    async fn exact_match(&self, name: &str) -> Result<Option<BoneCatalogEntry>> {
        (**self).exact_match(name).await
    }

    async fn prefix_match(&self, prefix: &str) -> Result<Vec<BoneCatalogEntry>> {
        (**self).prefix_match(prefix).await
    }
}
