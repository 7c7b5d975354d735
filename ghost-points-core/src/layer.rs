//! Collaborator traits for the host's layers.
//!
//! A [`MapLayer`] is anything the host can make active. Only layers that
//! expose a [`VectorLayer`] view carry a schema and attributes; the
//! visibility operations refuse everything else.

use crate::error::LayerError;
use crate::models::{AttributeValue, FeatureId, Field, Fields, GeometryKind, LayerKind};

pub trait MapLayer {
    fn name(&self) -> &str;

    fn kind(&self) -> LayerKind;

    fn as_vector(&self) -> Option<&dyn VectorLayer>;

    fn as_vector_mut(&mut self) -> Option<&mut dyn VectorLayer>;
}

/// Schema introspection, edit transactions and attribute mutation.
///
/// Schema and attribute changes are only accepted between
/// [`start_editing`](VectorLayer::start_editing) and either
/// [`commit_changes`](VectorLayer::commit_changes) or
/// [`roll_back`](VectorLayer::roll_back).
pub trait VectorLayer {
    fn geometry_kind(&self) -> GeometryKind;

    /// Current schema. Reflects uncommitted additions while editing.
    fn fields(&self) -> Fields;

    fn is_editing(&self) -> bool;

    fn start_editing(&mut self) -> Result<(), LayerError>;

    fn commit_changes(&mut self) -> Result<(), LayerError>;

    fn roll_back(&mut self) -> Result<(), LayerError>;

    fn add_attribute(&mut self, field: Field) -> Result<(), LayerError>;

    /// Reloads the cached schema from the underlying store.
    fn update_fields(&mut self) -> Result<(), LayerError>;

    /// Returns `Ok(false)` when no feature has the given id.
    fn change_attribute_value(
        &mut self,
        feature_id: FeatureId,
        field_index: usize,
        value: AttributeValue,
    ) -> Result<bool, LayerError>;

    fn attribute_value(
        &self,
        feature_id: FeatureId,
        field_index: usize,
    ) -> Result<Option<AttributeValue>, LayerError>;

    fn feature_ids(&self) -> Result<Vec<FeatureId>, LayerError>;

    fn selected_feature_ids(&self) -> Vec<FeatureId>;

    fn subset_string(&self) -> String;

    fn set_subset_string(&mut self, filter: &str) -> Result<(), LayerError>;

    /// Hint that the layer should be redrawn.
    fn trigger_repaint(&mut self);
}

/// True when the layer is a vector layer with point geometry.
pub fn is_point_layer(layer: &dyn MapLayer) -> bool {
    layer.kind() == LayerKind::Vector
        && layer
            .as_vector()
            .is_some_and(|v| v.geometry_kind() == GeometryKind::Point)
}
