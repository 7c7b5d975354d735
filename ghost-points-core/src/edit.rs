//! Scoped edit transaction on a vector layer.

use std::ops::{Deref, DerefMut};

use crate::error::LayerError;
use crate::layer::VectorLayer;

/// An open edit transaction.
///
/// Dropping the session without a successful [`commit`](EditSession::commit)
/// rolls the layer back, so an early `?` return never leaves the layer in
/// editing mode.
pub struct EditSession<'a> {
    layer: &'a mut dyn VectorLayer,
    finished: bool,
}

impl<'a> EditSession<'a> {
    pub fn begin(layer: &'a mut dyn VectorLayer) -> Result<Self, LayerError> {
        layer.start_editing()?;
        Ok(Self {
            layer,
            finished: false,
        })
    }

    /// Commits the pending changes. A failed commit is rolled back on drop.
    pub fn commit(mut self) -> Result<(), LayerError> {
        self.layer.commit_changes()?;
        self.finished = true;
        Ok(())
    }

    /// Discards the pending changes explicitly.
    pub fn roll_back(mut self) -> Result<(), LayerError> {
        self.finished = true;
        self.layer.roll_back()
    }
}

impl<'a> Deref for EditSession<'a> {
    type Target = dyn VectorLayer + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.layer
    }
}

impl<'a> DerefMut for EditSession<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.layer
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        if self.finished || !self.layer.is_editing() {
            return;
        }
        tracing::debug!("rolling back unfinished edit session");
        if let Err(e) = self.layer.roll_back() {
            tracing::warn!("rollback failed: {}", e);
        }
    }
}
