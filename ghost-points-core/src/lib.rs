//! Core library for Ghost Points.
//!
//! Ghost Points hides ("ghosts") selected point features on a vector layer by
//! setting an integer `_hidden` attribute and applying a subset filter, and
//! reveals them again on request. This crate holds the layer model, the
//! [`VisibilityManager`] and an SQLite-backed layer, independent of any UI.
//!
//! # Usage
//!
//! ```no_run
//! use ghost_points_core::db::Database;
//! use ghost_points_core::models::GeometryKind;
//! use ghost_points_core::VisibilityManager;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//! db.create_layer("trees", GeometryKind::Point)?;
//! let id = db.add_feature("trees", 12.5, 41.9)?;
//!
//! let mut layer = db.layer("trees")?;
//! let mut manager = VisibilityManager::new();
//! manager.hide_selected(&mut layer, &[id])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod edit;
pub mod error;
pub mod layer;
pub mod memory;
pub mod models;
pub mod notify;
pub mod visibility;

// Re-export commonly used types at crate root
pub use db::{Database, SqliteLayer};
pub use edit::EditSession;
pub use error::{GhostError, LayerError};
pub use layer::{MapLayer, VectorLayer};
pub use memory::MemoryLayer;
pub use notify::{Notifier, RecordingNotifier};
pub use visibility::{FieldOutcome, RevealOutcome, VisibilityManager, HIDDEN_FIELD, HIDDEN_FILTER};
