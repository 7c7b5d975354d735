//! Plugin configuration: where the plugin lives and which icons it shows.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const GHOST_ICON: &str = "ghost_icon.png";
pub const NO_GHOST_ICON: &str = "no_ghost_icon.png";

/// Environment variable that overrides the plugin directory.
pub const PLUGIN_DIR_ENV: &str = "GHOST_POINTS_PLUGIN_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    plugin_dir: PathBuf,
}

impl PluginConfig {
    pub fn from_dir(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    /// Uses `GHOST_POINTS_PLUGIN_DIR` when set, otherwise the platform data
    /// directory.
    pub fn discover() -> Result<Self> {
        if let Some(dir) = std::env::var_os(PLUGIN_DIR_ENV) {
            return Ok(Self::from_dir(dir));
        }
        let dirs = directories::ProjectDirs::from("", "", "ghost-points")
            .context("could not determine a data directory")?;
        Ok(Self::from_dir(dirs.data_dir().join("plugin")))
    }

    pub fn ghost_icon(&self) -> PathBuf {
        self.plugin_dir.join(GHOST_ICON)
    }

    pub fn no_ghost_icon(&self) -> PathBuf {
        self.plugin_dir.join(NO_GHOST_ICON)
    }

    /// Icon files that do not exist on disk.
    pub fn missing_icons(&self) -> Vec<PathBuf> {
        [self.ghost_icon(), self.no_ghost_icon()]
            .into_iter()
            .filter(|p| !p.is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icons_resolve_inside_plugin_dir() {
        let config = PluginConfig::from_dir("/opt/ghost");

        assert_eq!(config.ghost_icon(), PathBuf::from("/opt/ghost/ghost_icon.png"));
        assert_eq!(config.no_ghost_icon(), PathBuf::from("/opt/ghost/no_ghost_icon.png"));
    }

    #[test]
    fn reports_missing_icons() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(GHOST_ICON), b"png").unwrap();
        let config = PluginConfig::from_dir(dir.path());

        assert_eq!(config.missing_icons(), vec![dir.path().join(NO_GHOST_ICON)]);
    }
}
