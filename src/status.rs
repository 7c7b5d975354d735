use ghost_points_core::layer::{MapLayer, VectorLayer};
use ghost_points_core::models::{AttributeValue, FeatureId, GeometryKind, VisibilityState};
use ghost_points_core::{LayerError, SqliteLayer, VisibilityManager, HIDDEN_FIELD};
use serde::Serialize;

/// Snapshot of a layer and the session's ghosting state.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub layer: String,
    pub geometry: GeometryKind,
    pub state: VisibilityState,
    pub ghosted: Vec<FeatureId>,
    pub subset_string: String,
    pub has_hidden_field: bool,
    /// Features whose stored `_hidden` flag is 1.
    pub flagged: Vec<FeatureId>,
    pub visible: Vec<FeatureId>,
}

impl StatusReport {
    pub fn collect(layer: &SqliteLayer<'_>, manager: &VisibilityManager) -> Result<Self, LayerError> {
        let fields = layer.fields();
        let mut flagged = Vec::new();
        if let Some(index) = fields.lookup(HIDDEN_FIELD) {
            for id in layer.feature_ids()? {
                if layer.attribute_value(id, index)? == Some(AttributeValue::Integer(1)) {
                    flagged.push(id);
                }
            }
        }

        Ok(Self {
            layer: layer.name().to_string(),
            geometry: layer.geometry_kind(),
            state: manager.state(),
            ghosted: manager.ghosted().iter().copied().collect(),
            subset_string: layer.subset_string(),
            has_hidden_field: fields.contains(HIDDEN_FIELD),
            flagged,
            visible: layer.visible_feature_ids()?,
        })
    }

    pub fn render(&self) -> String {
        let filter = if self.subset_string.is_empty() {
            "(none)"
        } else {
            self.subset_string.as_str()
        };
        format!(
            "layer:    {} ({})\nstate:    {}\nghosted:  {}\nflagged:  {}\nvisible:  {}\nfilter:   {}\n",
            self.layer,
            self.geometry.as_str(),
            self.state.as_str(),
            join_ids(&self.ghosted),
            join_ids(&self.flagged),
            join_ids(&self.visible),
            filter,
        )
    }
}

fn join_ids(ids: &[FeatureId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
