//! Ghosting state for point features.
//!
//! The [`VisibilityManager`] owns the set of ghosted feature ids for a plugin
//! session and keeps three things in step: that set, the `_hidden` attribute
//! stored on the layer, and the layer's subset filter.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::edit::EditSession;
use crate::error::{GhostError, LayerError, Result};
use crate::layer::{is_point_layer, MapLayer, VectorLayer};
use crate::models::{AttributeValue, FeatureId, Field, FieldType, VisibilityState};
use crate::notify::Notifier;

pub const HIDDEN_FIELD: &str = "_hidden";
pub const HIDDEN_FIELD_COMMENT: &str = "Ghost points hidden status";

/// Filter applied while hiding. Layers are inspected outside this tool too,
/// so the text must not change.
pub const HIDDEN_FILTER: &str = "_hidden = 0 OR _hidden IS NULL";

pub const CONFIRM_REVEAL_TITLE: &str = "Confirm Reveal";
pub const CONFIRM_REVEAL_MESSAGE: &str = "Are you sure you want to reveal all hidden points?";

/// Subset string for the given hide mode.
pub fn filter_for(hide: bool) -> &'static str {
    if hide {
        HIDDEN_FILTER
    } else {
        ""
    }
}

/// Definition of the `_hidden` flag column.
pub fn hidden_field() -> Field {
    Field::new(HIDDEN_FIELD, FieldType::Integer)
        .with_length(1, 0)
        .with_comment(HIDDEN_FIELD_COMMENT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOutcome {
    Existing,
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RevealOutcome {
    Revealed { count: usize },
    Cancelled,
}

#[derive(Debug, Default)]
pub struct VisibilityManager {
    ghosted: BTreeSet<FeatureId>,
    state: VisibilityState,
}

impl VisibilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ghosted(&self) -> &BTreeSet<FeatureId> {
        &self.ghosted
    }

    pub fn is_ghosted(&self, id: FeatureId) -> bool {
        self.ghosted.contains(&id)
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    /// Adds the `_hidden` field to the layer unless it already has one.
    pub fn ensure_hidden_field(&self, layer: &mut dyn MapLayer) -> Result<FieldOutcome> {
        let name = layer.name().to_string();
        let vector = layer
            .as_vector_mut()
            .ok_or(GhostError::UnsupportedLayerKind)?;

        if vector.fields().contains(HIDDEN_FIELD) {
            return Ok(FieldOutcome::Existing);
        }

        add_hidden_field(vector).map_err(GhostError::FieldCreation)?;
        tracing::info!("Added {} field to layer {}", HIDDEN_FIELD, name);

        Ok(FieldOutcome::Created)
    }

    /// Writes the hide flag for every ghosted feature, then sets the filter.
    ///
    /// The filter is left untouched when the attribute update fails.
    pub fn apply_visibility(&mut self, layer: &mut dyn MapLayer, hide: bool) -> Result<()> {
        self.write_flags(layer, hide)?;
        self.set_filter(layer, hide)
    }

    fn write_flags(&self, layer: &mut dyn MapLayer, hide: bool) -> Result<()> {
        let vector = layer
            .as_vector_mut()
            .ok_or(GhostError::UnsupportedLayerKind)?;

        let flag = if hide { 1 } else { 0 };
        write_hidden_flag(vector, &self.ghosted, flag).map_err(GhostError::VisibilityApply)?;
        Ok(())
    }

    fn set_filter(&mut self, layer: &mut dyn MapLayer, hide: bool) -> Result<()> {
        let vector = layer
            .as_vector_mut()
            .ok_or(GhostError::UnsupportedLayerKind)?;

        vector
            .set_subset_string(filter_for(hide))
            .map_err(GhostError::VisibilityApply)?;
        vector.trigger_repaint();

        self.state = if hide {
            VisibilityState::Hidden
        } else {
            VisibilityState::Revealed
        };
        Ok(())
    }

    /// Ghosts the given selection, adding to whatever is already ghosted.
    ///
    /// Returns the size of the ghosted set afterwards.
    pub fn hide_selected(
        &mut self,
        layer: &mut dyn MapLayer,
        selection: &[FeatureId],
    ) -> Result<usize> {
        if !is_point_layer(layer) {
            return Err(GhostError::InvalidLayerSelection);
        }
        if selection.is_empty() {
            return Err(GhostError::NoFeaturesSelected);
        }

        self.ensure_hidden_field(layer)?;

        let previous = self.ghosted.clone();
        self.ghosted.extend(selection.iter().copied());

        // Ids whose flag was committed stay ghosted.
        if let Err(e) = self.write_flags(layer, true) {
            self.ghosted = previous;
            return Err(e);
        }
        self.set_filter(layer, true)?;

        tracing::info!(
            "Ghosted {} selected feature(s) on {}, {} ghosted in total",
            selection.len(),
            layer.name(),
            self.ghosted.len()
        );
        Ok(self.ghosted.len())
    }

    /// Reveals every ghosted feature after the user confirms.
    ///
    /// Declining the confirmation is not an error and changes nothing.
    pub fn reveal_all(
        &mut self,
        layer: &mut dyn MapLayer,
        notifier: &mut dyn Notifier,
    ) -> Result<RevealOutcome> {
        if !is_point_layer(layer) {
            return Err(GhostError::InvalidLayerSelection);
        }
        if !notifier.confirm(CONFIRM_REVEAL_TITLE, CONFIRM_REVEAL_MESSAGE) {
            tracing::debug!("Reveal declined by user");
            return Ok(RevealOutcome::Cancelled);
        }

        let vector = layer
            .as_vector_mut()
            .ok_or(GhostError::UnsupportedLayerKind)?;
        write_hidden_flag(vector, &self.ghosted, 0).map_err(GhostError::VisibilityApply)?;

        let count = self.ghosted.len();
        self.ghosted.clear();
        self.apply_visibility(layer, false)?;

        tracing::info!("Revealed {} feature(s) on {}", count, layer.name());
        Ok(RevealOutcome::Revealed { count })
    }

    /// Seeds the ghosted set from features whose stored `_hidden` flag is 1.
    ///
    /// Only called on explicit request: the ghosted set is not persisted, so a
    /// new session starts empty even when the layer still has hidden rows.
    pub fn restore_from_layer(&mut self, layer: &dyn MapLayer) -> Result<usize> {
        let vector = layer.as_vector().ok_or(GhostError::UnsupportedLayerKind)?;
        let Some(index) = vector.fields().lookup(HIDDEN_FIELD) else {
            return Ok(0);
        };

        let mut restored = 0;
        for id in vector.feature_ids().map_err(GhostError::VisibilityApply)? {
            let value = vector
                .attribute_value(id, index)
                .map_err(GhostError::VisibilityApply)?;
            if value == Some(AttributeValue::Integer(1)) && self.ghosted.insert(id) {
                restored += 1;
            }
        }

        if !self.ghosted.is_empty() {
            self.state = VisibilityState::Hidden;
        }
        tracing::debug!("Restored {} ghosted feature(s) from {}", restored, layer.name());
        Ok(restored)
    }
}

fn add_hidden_field(vector: &mut dyn VectorLayer) -> Result<(), LayerError> {
    let mut session = EditSession::begin(vector)?;
    session.add_attribute(hidden_field())?;
    session.update_fields()?;
    session.commit()
}

/// Sets `_hidden` to `flag` on each id inside one edit session.
///
/// The field index is resolved once. Ids the layer no longer has are skipped.
fn write_hidden_flag(
    vector: &mut dyn VectorLayer,
    ids: &BTreeSet<FeatureId>,
    flag: i64,
) -> Result<usize, LayerError> {
    let mut session = EditSession::begin(vector)?;

    let mut changed = 0;
    if !ids.is_empty() {
        let index = session
            .fields()
            .lookup(HIDDEN_FIELD)
            .ok_or_else(|| LayerError::FieldNotFound(HIDDEN_FIELD.to_string()))?;

        for &id in ids {
            if session.change_attribute_value(id, index, AttributeValue::Integer(flag))? {
                changed += 1;
            } else {
                tracing::debug!("Skipping missing feature {}", id);
            }
        }
    }

    session.commit()?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLayer;
    use crate::models::GeometryKind;
    use crate::notify::RecordingNotifier;

    fn points(n: usize) -> MemoryLayer {
        let mut layer = MemoryLayer::new("points", GeometryKind::Point);
        for i in 0..n {
            layer.add_feature(i as f64, 0.0);
        }
        layer
    }

    #[test]
    fn filter_text_is_exact() {
        assert_eq!(filter_for(true), "_hidden = 0 OR _hidden IS NULL");
        assert_eq!(filter_for(false), "");
    }

    #[test]
    fn hidden_field_definition() {
        let field = hidden_field();
        assert_eq!(field.name, "_hidden");
        assert_eq!(field.field_type, FieldType::Integer);
        assert_eq!((field.length, field.precision), (1, 0));
        assert!(field.comment.is_some());
    }

    #[test]
    fn hide_then_reveal_round_trip() {
        let mut layer = points(3);
        let mut manager = VisibilityManager::new();

        assert_eq!(manager.hide_selected(&mut layer, &[1, 3]).unwrap(), 2);
        assert_eq!(manager.state(), VisibilityState::Hidden);
        assert_eq!(layer.subset_string(), HIDDEN_FILTER);

        let mut ui = RecordingNotifier::answering(true);
        let outcome = manager.reveal_all(&mut layer, &mut ui).unwrap();

        assert_eq!(outcome, RevealOutcome::Revealed { count: 2 });
        assert_eq!(manager.state(), VisibilityState::Revealed);
        assert!(manager.ghosted().is_empty());
        assert_eq!(layer.subset_string(), "");
        assert_eq!(layer.value(1, HIDDEN_FIELD), Some(&AttributeValue::Integer(0)));
        assert_eq!(layer.value(2, HIDDEN_FIELD), Some(&AttributeValue::Null));
    }

    #[test]
    fn stale_ids_are_skipped() {
        let mut layer = points(1);
        let mut manager = VisibilityManager::new();

        manager.hide_selected(&mut layer, &[1, 99]).unwrap();

        assert!(manager.is_ghosted(99));
        assert_eq!(layer.value(1, HIDDEN_FIELD), Some(&AttributeValue::Integer(1)));
        assert!(!layer.is_editing());
    }

    #[test]
    fn apply_visibility_without_field_and_empty_set_only_sets_filter() {
        let mut layer = points(2);
        let mut manager = VisibilityManager::new();

        manager.apply_visibility(&mut layer, false).unwrap();

        assert!(!layer.fields().contains(HIDDEN_FIELD));
        assert_eq!(layer.subset_string(), "");
        assert_eq!(layer.repaint_count(), 1);
    }

    #[test]
    fn restore_reads_persisted_flags() {
        let mut layer = points(3);
        let mut first = VisibilityManager::new();
        first.hide_selected(&mut layer, &[2, 3]).unwrap();

        let mut second = VisibilityManager::new();
        assert_eq!(second.restore_from_layer(&layer).unwrap(), 2);
        assert_eq!(second.ghosted().iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(second.state(), VisibilityState::Hidden);
    }

    #[test]
    fn restore_without_field_is_empty() {
        let layer = points(3);
        let mut manager = VisibilityManager::new();

        assert_eq!(manager.restore_from_layer(&layer).unwrap(), 0);
        assert_eq!(manager.state(), VisibilityState::Revealed);
    }
}
