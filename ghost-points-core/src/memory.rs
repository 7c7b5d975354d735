//! In-memory vector layer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::LayerError;
use crate::layer::{MapLayer, VectorLayer};
use crate::models::{AttributeValue, FeatureId, Field, Fields, GeometryKind, LayerKind};

/// A feature of a [`MemoryLayer`]. Attributes are positional, aligned with
/// the layer's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFeature {
    pub id: FeatureId,
    pub x: f64,
    pub y: f64,
    pub attributes: Vec<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    fields: Fields,
    features: BTreeMap<FeatureId, MemoryFeature>,
    schema_revision: u64,
}

/// Vector layer held entirely in memory.
///
/// Edits apply to the live state immediately; `start_editing` takes a
/// snapshot that `roll_back` restores.
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    name: String,
    geometry_kind: GeometryKind,
    fields: Fields,
    features: BTreeMap<FeatureId, MemoryFeature>,
    selection: BTreeSet<FeatureId>,
    subset_string: String,
    edit_snapshot: Option<Snapshot>,
    next_id: FeatureId,
    schema_revision: u64,
    repaint_count: u64,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>, geometry_kind: GeometryKind) -> Self {
        Self {
            name: name.into(),
            geometry_kind,
            fields: Fields::default(),
            features: BTreeMap::new(),
            selection: BTreeSet::new(),
            subset_string: String::new(),
            edit_snapshot: None,
            next_id: 1,
            schema_revision: 0,
            repaint_count: 0,
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = Fields::new(fields);
        self
    }

    /// Adds a feature with all attributes NULL and returns its id.
    pub fn add_feature(&mut self, x: f64, y: f64) -> FeatureId {
        let id = self.next_id;
        self.next_id += 1;
        self.features.insert(
            id,
            MemoryFeature {
                id,
                x,
                y,
                attributes: vec![AttributeValue::Null; self.fields.len()],
            },
        );
        id
    }

    pub fn feature(&self, id: FeatureId) -> Option<&MemoryFeature> {
        self.features.get(&id)
    }

    /// Value of the named attribute, `None` if the feature or field is missing.
    pub fn value(&self, id: FeatureId, field: &str) -> Option<&AttributeValue> {
        let index = self.fields.lookup(field)?;
        self.features.get(&id)?.attributes.get(index)
    }

    pub fn select(&mut self, ids: impl IntoIterator<Item = FeatureId>) {
        self.selection = ids
            .into_iter()
            .filter(|id| self.features.contains_key(id))
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Number of committed or pending schema additions.
    pub fn schema_revision(&self) -> u64 {
        self.schema_revision
    }

    pub fn repaint_count(&self) -> u64 {
        self.repaint_count
    }

    fn require_editing(&self) -> Result<(), LayerError> {
        if self.edit_snapshot.is_none() {
            return Err(LayerError::NotEditing);
        }
        Ok(())
    }
}

impl MapLayer for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
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

impl VectorLayer for MemoryLayer {
    fn geometry_kind(&self) -> GeometryKind {
        self.geometry_kind
    }

    fn fields(&self) -> Fields {
        self.fields.clone()
    }

    fn is_editing(&self) -> bool {
        self.edit_snapshot.is_some()
    }

    fn start_editing(&mut self) -> Result<(), LayerError> {
        if self.edit_snapshot.is_some() {
            return Err(LayerError::AlreadyEditing);
        }
        self.edit_snapshot = Some(Snapshot {
            fields: self.fields.clone(),
            features: self.features.clone(),
            schema_revision: self.schema_revision,
        });
        Ok(())
    }

    fn commit_changes(&mut self) -> Result<(), LayerError> {
        self.require_editing()?;
        self.edit_snapshot = None;
        Ok(())
    }

    fn roll_back(&mut self) -> Result<(), LayerError> {
        let snapshot = self.edit_snapshot.take().ok_or(LayerError::NotEditing)?;
        self.fields = snapshot.fields;
        self.features = snapshot.features;
        self.schema_revision = snapshot.schema_revision;
        Ok(())
    }

    fn add_attribute(&mut self, field: Field) -> Result<(), LayerError> {
        self.require_editing()?;
        if self.fields.contains(&field.name) {
            return Err(LayerError::FieldExists(field.name));
        }
        self.fields.push(field);
        for feature in self.features.values_mut() {
            feature.attributes.push(AttributeValue::Null);
        }
        self.schema_revision += 1;
        Ok(())
    }

    fn update_fields(&mut self) -> Result<(), LayerError> {
        Ok(())
    }

    fn change_attribute_value(
        &mut self,
        feature_id: FeatureId,
        field_index: usize,
        value: AttributeValue,
    ) -> Result<bool, LayerError> {
        self.require_editing()?;
        if field_index >= self.fields.len() {
            return Err(LayerError::FieldIndexOutOfRange(field_index));
        }
        match self.features.get_mut(&feature_id) {
            Some(feature) => {
                feature.attributes[field_index] = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn attribute_value(
        &self,
        feature_id: FeatureId,
        field_index: usize,
    ) -> Result<Option<AttributeValue>, LayerError> {
        if field_index >= self.fields.len() {
            return Err(LayerError::FieldIndexOutOfRange(field_index));
        }
        Ok(self
            .features
            .get(&feature_id)
            .map(|f| f.attributes[field_index].clone()))
    }

    fn feature_ids(&self) -> Result<Vec<FeatureId>, LayerError> {
        Ok(self.features.keys().copied().collect())
    }

    fn selected_feature_ids(&self) -> Vec<FeatureId> {
        self.selection.iter().copied().collect()
    }

    fn subset_string(&self) -> String {
        self.subset_string.clone()
    }

    fn set_subset_string(&mut self, filter: &str) -> Result<(), LayerError> {
        self.subset_string = filter.to_string();
        Ok(())
    }

    fn trigger_repaint(&mut self) {
        self.repaint_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;

    fn layer_with_points(n: usize) -> MemoryLayer {
        let mut layer = MemoryLayer::new("points", GeometryKind::Point)
            .with_fields(vec![Field::new("name", FieldType::Text)]);
        for i in 0..n {
            layer.add_feature(i as f64, i as f64);
        }
        layer
    }

    #[test]
    fn edits_require_editing_mode() {
        let mut layer = layer_with_points(1);

        let err = layer
            .change_attribute_value(1, 0, AttributeValue::from("a"))
            .unwrap_err();
        assert!(matches!(err, LayerError::NotEditing));

        let err = layer
            .add_attribute(Field::new("x", FieldType::Integer))
            .unwrap_err();
        assert!(matches!(err, LayerError::NotEditing));
    }

    #[test]
    fn roll_back_restores_schema_and_values() {
        let mut layer = layer_with_points(2);

        layer.start_editing().unwrap();
        layer.add_attribute(Field::new("extra", FieldType::Integer)).unwrap();
        layer.change_attribute_value(1, 0, AttributeValue::from("changed")).unwrap();
        layer.roll_back().unwrap();

        assert!(!layer.is_editing());
        assert_eq!(layer.fields().len(), 1);
        assert_eq!(layer.schema_revision(), 0);
        assert_eq!(layer.value(1, "name"), Some(&AttributeValue::Null));
        assert_eq!(layer.feature(1).unwrap().attributes.len(), 1);
    }

    #[test]
    fn change_on_missing_feature_reports_false() {
        let mut layer = layer_with_points(1);
        layer.start_editing().unwrap();

        assert!(!layer.change_attribute_value(42, 0, AttributeValue::Null).unwrap());
        assert!(layer.change_attribute_value(1, 0, AttributeValue::from("a")).unwrap());
    }

    #[test]
    fn selection_ignores_unknown_ids() {
        let mut layer = layer_with_points(3);
        layer.select([3, 1, 9]);

        assert_eq!(layer.selected_feature_ids(), vec![1, 3]);
    }

    #[test]
    fn second_start_editing_is_rejected() {
        let mut layer = layer_with_points(0);
        layer.start_editing().unwrap();

        assert!(matches!(layer.start_editing(), Err(LayerError::AlreadyEditing)));
    }
}
