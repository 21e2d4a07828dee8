//! SQLite-backed [`BoneCatalog`].
//!
//! Lookups compare `mesh_name` and `en_name` ASCII case-insensitively, the
//! same way the in-memory catalog does. Rows come back in insertion order.

use anyhow::Result;
use async_trait::async_trait;
use bone_atlas_core::catalog::BoneCatalog;
use bone_atlas_core::models::BoneCatalogEntry;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const COLUMNS: &str =
    "bone_id, small_bone_id, zh_name, en_name, region, description, mesh_name, place";

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every catalog row, ordered by bone id then sub-part id.
    pub async fn all_entries(&self) -> Result<Vec<BoneCatalogEntry>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM bone_catalog ORDER BY bone_id, small_bone_key, rowid"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM bone_catalog")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

fn entry_from_row(row: &SqliteRow) -> BoneCatalogEntry {
    BoneCatalogEntry {
        bone_id: row.get("bone_id"),
        small_bone_id: row.get("small_bone_id"),
        zh_name: row.get("zh_name"),
        en_name: row.get("en_name"),
        region: row.get("region"),
        description: row.get("description"),
        mesh_name: row.get("mesh_name"),
        place: row.get("place"),
    }
}

/// Escape `%`, `_` and the escape char itself for a `LIKE ... ESCAPE '\'`.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl BoneCatalog for SqliteCatalog {
    async fn exact_match(&self, name: &str) -> Result<Option<BoneCatalogEntry>> {
        if name.is_empty() {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {COLUMNS} FROM bone_catalog
             WHERE (mesh_name IS NOT NULL AND mesh_name <> '' AND LOWER(mesh_name) = LOWER(?1))
                OR (en_name <> '' AND LOWER(en_name) = LOWER(?1))
             ORDER BY rowid
             LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(entry_from_row))
    }

    async fn prefix_match(&self, prefix: &str) -> Result<Vec<BoneCatalogEntry>> {
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {COLUMNS} FROM bone_catalog
             WHERE (mesh_name IS NOT NULL AND mesh_name <> '' AND mesh_name LIKE ?1 || '%' ESCAPE '\\')
                OR (en_name <> '' AND en_name LIKE ?1 || '%' ESCAPE '\\')
             ORDER BY rowid"
        );
        let rows = sqlx::query(&sql)
            .bind(escape_like(prefix))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }
}
