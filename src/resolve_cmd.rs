//! `bonectl resolve` and `bonectl normalize`.

use anyhow::Result;
use bone_atlas_core::aggregate::Aggregator;
use bone_atlas_core::normalize::normalize;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::sqlite_catalog::SqliteCatalog;

/// Resolve one identifier and print the resolution as JSON.
///
/// Returns `false` when nothing matched so the caller can exit non-zero.
pub async fn run_resolve(config: &Config, identifier: &str) -> Result<bool> {
    let pool = db::connect(config).await?;
    let catalog = SqliteCatalog::new(pool);
    let resolution = Aggregator::new(&catalog)
        .with_aliases(config.aliases.clone())
        .resolve_label(identifier)
        .await?;

    if !resolution.is_resolved() {
        info!(identifier, "no catalog match");
    }
    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(resolution.is_resolved())
}

/// Print the normalized form and lookup candidates. Needs no database.
pub fn run_normalize(identifier: &str) -> Result<()> {
    let ident = normalize(identifier);
    println!("{}", serde_json::to_string_pretty(&ident)?);
    Ok(())
}
