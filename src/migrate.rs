//! Catalog schema migrations. Idempotent.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    info!(path = %config.db.path.display(), "catalog schema ready");
    Ok(())
}

/// Apply the schema to an open pool.
pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    // small_bone_key is small_bone_id or 0, so whole-bone rows stay unique
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bone_catalog (
            bone_id INTEGER NOT NULL,
            small_bone_id INTEGER,
            small_bone_key INTEGER NOT NULL DEFAULT 0,
            zh_name TEXT NOT NULL DEFAULT '',
            en_name TEXT NOT NULL DEFAULT '',
            region TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            mesh_name TEXT,
            place TEXT,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (bone_id, small_bone_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bone_catalog_mesh ON bone_catalog(mesh_name COLLATE NOCASE)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bone_catalog_en ON bone_catalog(en_name COLLATE NOCASE)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
