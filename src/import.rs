//! Catalog import from a JSON array of bone rows.
//!
//! ```json
//! [
//!   {"bone_id": 40, "small_bone_id": 401, "zh_name": "顳骨", "en_name": "Temporal bone",
//!    "mesh_name": "Temporal.L", "place": "left"}
//! ]
//! ```
//!
//! Rows are upserted on `(bone_id, small_bone_id)`, so re-importing an
//! updated export replaces names in place.

use anyhow::{bail, Context, Result};
use bone_atlas_core::models::BoneCatalogEntry;
use chrono::Utc;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::db;
use crate::migrate;

/// Outcome of an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub rows: usize,
    pub skipped: usize,
}

pub fn read_entries(path: &Path) -> Result<Vec<BoneCatalogEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    let entries: Vec<BoneCatalogEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;
    Ok(entries)
}

pub async fn import_catalog(config: &Config, path: &Path) -> Result<ImportStats> {
    let entries = read_entries(path)?;
    if entries.is_empty() {
        bail!("Catalog file contains no rows: {}", path.display());
    }

    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let stats = upsert_entries(&pool, &entries).await?;
    pool.close().await;

    info!(
        rows = stats.rows,
        skipped = stats.skipped,
        file = %path.display(),
        "catalog imported"
    );
    Ok(stats)
}

/// Upsert rows in one transaction. Rows with no usable name are skipped.
pub async fn upsert_entries(pool: &SqlitePool, entries: &[BoneCatalogEntry]) -> Result<ImportStats> {
    let now = Utc::now().timestamp();
    let mut tx = pool.begin().await?;
    let mut stats = ImportStats {
        rows: 0,
        skipped: 0,
    };

    for entry in entries {
        if entry.lookup_name().trim().is_empty() && entry.zh_name.trim().is_empty() {
            warn!(bone_id = entry.bone_id, "skipping catalog row without a name");
            stats.skipped += 1;
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO bone_catalog
                (bone_id, small_bone_id, small_bone_key, zh_name, en_name, region,
                 description, mesh_name, place, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(bone_id, small_bone_key) DO UPDATE SET
                small_bone_id = excluded.small_bone_id,
                zh_name = excluded.zh_name,
                en_name = excluded.en_name,
                region = excluded.region,
                description = excluded.description,
                mesh_name = excluded.mesh_name,
                place = excluded.place,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entry.bone_id)
        .bind(entry.small_bone_id)
        .bind(entry.small_bone_id.unwrap_or(0))
        .bind(&entry.zh_name)
        .bind(&entry.en_name)
        .bind(&entry.region)
        .bind(&entry.description)
        .bind(entry.mesh_name.as_deref())
        .bind(entry.place.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await?;
        stats.rows += 1;
    }

    tx.commit().await?;
    Ok(stats)
}
