//! The plugin shell around the visibility manager.
//!
//! [`GhostPoints`] registers the two toolbar actions and turns every outcome
//! of the core operations into a message for the user.

use std::path::PathBuf;

use ghost_points_core::layer::MapLayer;
use ghost_points_core::models::NoticeKind;
use ghost_points_core::{GhostError, Notifier, RevealOutcome, VisibilityManager};
use serde::Serialize;

use crate::config::PluginConfig;

pub const PLUGIN_TITLE: &str = "Ghost Points";
pub const ERROR_TITLE: &str = "Ghost Points Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    SummonGhost,
    BanishGhost,
}

impl ActionId {
    pub fn title(&self) -> &'static str {
        match self {
            Self::SummonGhost => "Summon Ghost",
            Self::BanishGhost => "Banish Ghost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarAction {
    pub id: ActionId,
    pub title: String,
    pub icon: PathBuf,
}

/// Host toolbar that plugin actions are added to.
pub trait Toolbar {
    fn add_action(&mut self, action: &ToolbarAction);
    fn remove_action(&mut self, id: ActionId);
}

/// Toolbar that just keeps the registered actions.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<ToolbarAction>,
}

impl ActionRegistry {
    pub fn actions(&self) -> &[ToolbarAction] {
        &self.actions
    }
}

impl Toolbar for ActionRegistry {
    fn add_action(&mut self, action: &ToolbarAction) {
        self.actions.retain(|a| a.id != action.id);
        self.actions.push(action.clone());
    }

    fn remove_action(&mut self, id: ActionId) {
        self.actions.retain(|a| a.id != id);
    }
}

/// Result of a triggered action after the user has been informed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ActionOutcome {
    Hidden { ghosted: usize },
    Revealed { count: usize },
    Cancelled,
    Reported { kind: NoticeKind },
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Reported {
                kind: NoticeKind::Warning | NoticeKind::Critical
            }
        )
    }
}

pub struct GhostPoints {
    config: PluginConfig,
    manager: VisibilityManager,
    registered: Vec<ActionId>,
}

impl GhostPoints {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            manager: VisibilityManager::new(),
            registered: Vec::new(),
        }
    }

    pub fn manager(&self) -> &VisibilityManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut VisibilityManager {
        &mut self.manager
    }

    pub fn init_gui(&mut self, toolbar: &mut dyn Toolbar) {
        for path in self.config.missing_icons() {
            tracing::warn!("Icon not found: {}", path.display());
        }

        let actions = [
            (ActionId::SummonGhost, self.config.ghost_icon()),
            (ActionId::BanishGhost, self.config.no_ghost_icon()),
        ];
        for (id, icon) in actions {
            toolbar.add_action(&ToolbarAction {
                id,
                title: id.title().to_string(),
                icon,
            });
            self.registered.push(id);
        }
        tracing::debug!("Registered {} toolbar actions", self.registered.len());
    }

    pub fn unload(&mut self, toolbar: &mut dyn Toolbar) {
        for id in self.registered.drain(..) {
            toolbar.remove_action(id);
        }
    }

    pub fn trigger(
        &mut self,
        id: ActionId,
        layer: Option<&mut dyn MapLayer>,
        ui: &mut dyn Notifier,
    ) -> ActionOutcome {
        match id {
            ActionId::SummonGhost => self.hide_selected_points(layer, ui),
            ActionId::BanishGhost => self.reveal_all_points(layer, ui),
        }
    }

    /// Ghosts the features selected on the active layer.
    pub fn hide_selected_points(
        &mut self,
        layer: Option<&mut dyn MapLayer>,
        ui: &mut dyn Notifier,
    ) -> ActionOutcome {
        let Some(layer) = layer else {
            return report(ui, &GhostError::InvalidLayerSelection);
        };
        let selection = layer
            .as_vector()
            .map(|v| v.selected_feature_ids())
            .unwrap_or_default();

        match self.manager.hide_selected(layer, &selection) {
            Ok(ghosted) => ActionOutcome::Hidden { ghosted },
            Err(e) => report(ui, &e),
        }
    }

    /// Reveals every ghosted feature after asking the user.
    pub fn reveal_all_points(
        &mut self,
        layer: Option<&mut dyn MapLayer>,
        ui: &mut dyn Notifier,
    ) -> ActionOutcome {
        let Some(layer) = layer else {
            return report(ui, &GhostError::InvalidLayerSelection);
        };

        match self.manager.reveal_all(layer, ui) {
            Ok(RevealOutcome::Revealed { count }) => ActionOutcome::Revealed { count },
            Ok(RevealOutcome::Cancelled) => ActionOutcome::Cancelled,
            Err(e) => report(ui, &e),
        }
    }
}

fn notice_for(err: &GhostError) -> (NoticeKind, &'static str) {
    match err {
        GhostError::NoFeaturesSelected => (NoticeKind::Information, PLUGIN_TITLE),
        GhostError::InvalidLayerSelection | GhostError::UnsupportedLayerKind => {
            (NoticeKind::Warning, PLUGIN_TITLE)
        }
        GhostError::FieldCreation(_) | GhostError::VisibilityApply(_) => {
            (NoticeKind::Critical, ERROR_TITLE)
        }
    }
}

fn report(ui: &mut dyn Notifier, err: &GhostError) -> ActionOutcome {
    let (kind, title) = notice_for(err);
    if kind == NoticeKind::Critical {
        tracing::error!("{}", err);
    }
    ui.notify(kind, title, &err.to_string());
    ActionOutcome::Reported { kind }
}
