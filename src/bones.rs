//! `bonectl bones`: the catalog as viewer cards.

use anyhow::Result;
use bone_atlas_core::group::group_bones;

use crate::config::Config;
use crate::db;
use crate::sqlite_catalog::SqliteCatalog;

pub async fn run_bones(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let catalog = SqliteCatalog::new(pool);
    let entries = catalog.all_entries().await?;
    let groups = group_bones(&entries);
    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}
