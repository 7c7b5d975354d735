//! Ghost Points: hide selected point features and reveal them later.
//!
//! The heavy lifting lives in `ghost_points_core`; this crate adds the plugin
//! shell, a terminal binding for the host dialogs and the interactive session
//! used by the `ghost-points` binary.

pub mod config;
pub mod plugin;
pub mod shell;
pub mod status;
pub mod terminal;

pub use config::PluginConfig;
pub use plugin::{ActionId, ActionOutcome, GhostPoints};
