//! SQLite storage for vector layers.
//!
//! Each layer is a table with `fid`, `x` and `y` columns plus one column per
//! attribute field. Layer metadata (geometry type, subset filter, field
//! comments) lives in the tables defined in [`schema`].

mod layer;
pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{FeatureId, GeometryKind, LayerInfo};
use schema::quote_ident;

pub use layer::SqliteLayer;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        tracing::debug!("Opened database {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Opens the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "ghost-points")
            .context("could not determine a data directory")?;
        Ok(dirs.data_dir().join("ghost-points.db"))
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    /// Creates a layer table and registers it.
    pub fn create_layer(&self, name: &str, geometry_kind: GeometryKind) -> Result<()> {
        if self.layer_info(name)?.is_some() {
            bail!("layer already exists: {}", name);
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&format!(
            "CREATE TABLE {} (
                fid INTEGER PRIMARY KEY AUTOINCREMENT,
                x REAL NOT NULL,
                y REAL NOT NULL
            );",
            quote_ident(name)
        ))?;
        tx.execute(
            "INSERT INTO layer_metadata (table_name, geometry_type) VALUES (?1, ?2)",
            params![name, geometry_kind.as_str()],
        )?;
        tx.commit()?;

        tracing::info!("Created {} layer {}", geometry_kind.as_str(), name);
        Ok(())
    }

    /// Inserts a feature and returns its id.
    pub fn add_feature(&self, layer: &str, x: f64, y: f64) -> Result<FeatureId> {
        if self.layer_info(layer)?.is_none() {
            bail!("layer not found: {}", layer);
        }
        self.conn.execute(
            &format!("INSERT INTO {} (x, y) VALUES (?1, ?2)", quote_ident(layer)),
            params![x, y],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn layer_info(&self, name: &str) -> Result<Option<LayerInfo>> {
        let row = self
            .conn
            .query_row(
                "SELECT table_name, geometry_type, subset_string FROM layer_metadata WHERE table_name = ?1",
                params![name],
                |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?)),
            )
            .optional()?;

        let Some((name, geometry, subset_string)) = row else {
            return Ok(None);
        };
        let feature_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(&name)),
            [],
            |r| r.get(0),
        )?;

        Ok(Some(LayerInfo {
            geometry_kind: GeometryKind::from_str(&geometry).unwrap_or(GeometryKind::Unknown),
            name,
            subset_string,
            feature_count,
        }))
    }

    pub fn list_layers(&self) -> Result<Vec<LayerInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT table_name FROM layer_metadata ORDER BY table_name")?;
        let names = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut layers = Vec::with_capacity(names.len());
        for name in names {
            if let Some(info) = self.layer_info(&name)? {
                layers.push(info);
            }
        }
        Ok(layers)
    }

    /// Opens a registered layer for reading and editing.
    pub fn layer(&self, name: &str) -> Result<SqliteLayer<'_>, crate::error::LayerError> {
        SqliteLayer::open(&self.conn, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_list_layers() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();

        db.create_layer("trees", GeometryKind::Point).unwrap();
        db.create_layer("roads", GeometryKind::Line).unwrap();
        db.add_feature("trees", 1.0, 2.0).unwrap();

        let layers = db.list_layers().unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "roads");
        assert_eq!(layers[1].geometry_kind, GeometryKind::Point);
        assert_eq!(layers[1].feature_count, 1);
        assert_eq!(layers[1].subset_string, "");
    }

    #[test]
    fn duplicate_layer_is_rejected() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db.create_layer("trees", GeometryKind::Point).unwrap();

        assert!(db.create_layer("trees", GeometryKind::Point).is_err());
    }

    #[test]
    fn add_feature_to_unknown_layer_fails() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();

        assert!(db.add_feature("missing", 0.0, 0.0).is_err());
    }

    #[test]
    fn migrate_is_idempotent() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db.migrate().unwrap();
    }
}
