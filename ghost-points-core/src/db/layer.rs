use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension};

use super::schema::{quote_ident, GEOMETRY_COLUMNS};
use crate::error::LayerError;
use crate::layer::{MapLayer, VectorLayer};
use crate::models::{AttributeValue, FeatureId, Field, FieldType, Fields, GeometryKind, LayerKind};

/// A vector layer backed by an SQLite table.
///
/// Edit sessions map onto an SQLite transaction on the shared connection, so
/// schema changes made with `ALTER TABLE` roll back with everything else.
pub struct SqliteLayer<'db> {
    conn: &'db Connection,
    table: String,
    geometry_kind: GeometryKind,
    fields: Fields,
    selection: BTreeSet<FeatureId>,
    subset_string: String,
}

impl<'db> SqliteLayer<'db> {
    pub(crate) fn open(conn: &'db Connection, table: &str) -> Result<Self, LayerError> {
        let row = conn
            .query_row(
                "SELECT geometry_type, subset_string FROM layer_metadata WHERE table_name = ?1",
                params![table],
                |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
            )
            .optional()?;
        let (geometry, subset_string) =
            row.ok_or_else(|| LayerError::TableNotFound(table.to_string()))?;

        let mut layer = Self {
            conn,
            table: table.to_string(),
            geometry_kind: GeometryKind::from_str(&geometry).unwrap_or(GeometryKind::Unknown),
            fields: Fields::default(),
            selection: BTreeSet::new(),
            subset_string,
        };
        layer.update_fields()?;
        Ok(layer)
    }

    /// Replaces the selection with the given ids, ignoring ids not in the table.
    pub fn select(&mut self, ids: impl IntoIterator<Item = FeatureId>) -> Result<(), LayerError> {
        let existing: BTreeSet<FeatureId> = self.feature_ids()?.into_iter().collect();
        self.selection = ids.into_iter().filter(|id| existing.contains(id)).collect();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Ids of the features that pass the current subset filter.
    pub fn visible_feature_ids(&self) -> Result<Vec<FeatureId>, LayerError> {
        let sql = format!(
            "SELECT fid FROM {}{} ORDER BY fid",
            quote_ident(&self.table),
            where_clause(&self.subset_string)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<FeatureId>, _>>()?;
        Ok(ids)
    }

    /// Value of a named attribute, `None` if the feature does not exist.
    pub fn value(&self, feature_id: FeatureId, field: &str) -> Result<Option<AttributeValue>, LayerError> {
        let index = self
            .fields
            .lookup(field)
            .ok_or_else(|| LayerError::FieldNotFound(field.to_string()))?;
        self.attribute_value(feature_id, index)
    }

    fn require_editing(&self) -> Result<(), LayerError> {
        if !self.is_editing() {
            return Err(LayerError::NotEditing);
        }
        Ok(())
    }

    fn column(&self, field_index: usize) -> Result<String, LayerError> {
        self.fields
            .get(field_index)
            .map(|f| quote_ident(&f.name))
            .ok_or(LayerError::FieldIndexOutOfRange(field_index))
    }
}

fn where_clause(filter: &str) -> String {
    if filter.trim().is_empty() {
        String::new()
    } else {
        format!(" WHERE ({})", filter)
    }
}

impl MapLayer for SqliteLayer<'_> {
    fn name(&self) -> &str {
        &self.table
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Vector
    }

    fn as_vector(&self) -> Option<&dyn VectorLayer> {
        Some(self)
    }

    fn as_vector_mut(&mut self) -> Option<&mut dyn VectorLayer> {
        Some(self)
    }
}

impl VectorLayer for SqliteLayer<'_> {
    fn geometry_kind(&self) -> GeometryKind {
        self.geometry_kind
    }

    fn fields(&self) -> Fields {
        self.fields.clone()
    }

    fn is_editing(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn start_editing(&mut self) -> Result<(), LayerError> {
        if self.is_editing() {
            return Err(LayerError::AlreadyEditing);
        }
        self.conn.execute_batch("BEGIN")?;
        tracing::trace!("Started editing {}", self.table);
        Ok(())
    }

    fn commit_changes(&mut self) -> Result<(), LayerError> {
        self.require_editing()?;
        self.conn.execute_batch("COMMIT")?;
        tracing::trace!("Committed changes to {}", self.table);
        Ok(())
    }

    fn roll_back(&mut self) -> Result<(), LayerError> {
        self.require_editing()?;
        self.conn.execute_batch("ROLLBACK")?;
        tracing::debug!("Rolled back changes to {}", self.table);
        self.update_fields()
    }

    fn add_attribute(&mut self, field: Field) -> Result<(), LayerError> {
        self.require_editing()?;
        if self.fields.contains(&field.name) {
            return Err(LayerError::FieldExists(field.name));
        }

        self.conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote_ident(&self.table),
            quote_ident(&field.name),
            field.field_type.sql_type()
        ))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO layer_fields (table_name, field_name, length, precision, comment)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.table, field.name, field.length, field.precision, field.comment],
        )?;

        self.fields.push(field);
        Ok(())
    }

    fn update_fields(&mut self) -> Result<(), LayerError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, c.type, f.length, f.precision, f.comment
             FROM pragma_table_info(?1) AS c
             LEFT JOIN layer_fields AS f ON f.table_name = ?1 AND f.field_name = c.name
             ORDER BY c.cid",
        )?;
        let fields = stmt
            .query_map(params![self.table], |r| {
                Ok(Field {
                    name: r.get(0)?,
                    field_type: FieldType::from_sql_type(&r.get::<_, String>(1)?),
                    length: r.get::<_, Option<u32>>(2)?.unwrap_or(0),
                    precision: r.get::<_, Option<u32>>(3)?.unwrap_or(0),
                    comment: r.get(4)?,
                })
            })?
            .filter(|f| {
                f.as_ref()
                    .map_or(true, |f| !GEOMETRY_COLUMNS.contains(&f.name.as_str()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.fields = Fields::new(fields);
        Ok(())
    }

    fn change_attribute_value(
        &mut self,
        feature_id: FeatureId,
        field_index: usize,
        value: AttributeValue,
    ) -> Result<bool, LayerError> {
        self.require_editing()?;
        let column = self.column(field_index)?;
        let changed = self.conn.execute(
            &format!("UPDATE {} SET {} = ?1 WHERE fid = ?2", quote_ident(&self.table), column),
            params![value, feature_id],
        )?;
        Ok(changed > 0)
    }

    fn attribute_value(
        &self,
        feature_id: FeatureId,
        field_index: usize,
    ) -> Result<Option<AttributeValue>, LayerError> {
        let column = self.column(field_index)?;
        let value = self
            .conn
            .query_row(
                &format!("SELECT {} FROM {} WHERE fid = ?1", column, quote_ident(&self.table)),
                params![feature_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn feature_ids(&self) -> Result<Vec<FeatureId>, LayerError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT fid FROM {} ORDER BY fid", quote_ident(&self.table)))?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<FeatureId>, _>>()?;
        Ok(ids)
    }

    fn selected_feature_ids(&self) -> Vec<FeatureId> {
        self.selection.iter().copied().collect()
    }

    fn subset_string(&self) -> String {
        self.subset_string.clone()
    }

    /// Rejects filters SQLite cannot evaluate against this table.
    fn set_subset_string(&mut self, filter: &str) -> Result<(), LayerError> {
        self.conn.prepare(&format!(
            "SELECT fid FROM {}{}",
            quote_ident(&self.table),
            where_clause(filter)
        ))?;
        self.conn.execute(
            "UPDATE layer_metadata SET subset_string = ?1 WHERE table_name = ?2",
            params![filter, self.table],
        )?;
        self.subset_string = filter.to_string();
        Ok(())
    }

    fn trigger_repaint(&mut self) {
        tracing::trace!("Repaint requested for {}", self.table);
    }
}

impl Drop for SqliteLayer<'_> {
    fn drop(&mut self) {
        if self.is_editing() {
            tracing::warn!("Layer {} dropped while editing, rolling back", self.table);
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!("rollback failed: {}", e);
            }
        }
    }
}
