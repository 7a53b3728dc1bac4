//! Settings Module
//!
//! Screen configuration: workspace count and names, the placement policy and
//! its scan directions, and the decoration border width. Persisted as TOML
//! under the user config dir.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Placement policy for newly mapped windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementPolicy {
    /// Scan free space row by row; fall back to cascade when nothing fits.
    RowSmart,
    /// Scan free space column by column; fall back to cascade when nothing fits.
    ColSmart,
    /// Diagonal cascade from the top-left of the available area.
    Cascade,
}

/// Horizontal scan direction for smart placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowDirection {
    LeftRight,
    RightLeft,
}

/// Vertical scan direction for smart placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColDirection {
    TopBottom,
    BottomTop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    /// Number of workspaces created at screen setup.
    pub workspace_count: u32,

    /// Configured workspace names; workspaces past the end of this list get
    /// the default "Workspace N" name.
    pub workspace_names: Vec<String>,

    pub placement_policy: PlacementPolicy,
    pub row_direction: RowDirection,
    pub col_direction: ColDirection,

    /// Decoration border width in pixels.
    pub border_width: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            workspace_count: 4,
            workspace_names: Vec::new(),
            placement_policy: PlacementPolicy::RowSmart,
            row_direction: RowDirection::LeftRight,
            col_direction: ColDirection::TopBottom,
            border_width: 1,
        }
    }
}

impl ScreenSettings {
    /// Default settings file location, when a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("graphite").join("settings.toml"))
    }

    /// Load settings, falling back to defaults on a missing or malformed
    /// file.
    pub fn load_from_file(path: &Path) -> Self {
        debug!("Loading settings from {}", path.display());

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ScreenSettings>(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    warn!(
                        "Failed to parse settings file {}: {}, using defaults",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read settings file {}: {}, using defaults",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Configured name for workspace `id`, when one is set.
    pub fn workspace_name(&self, id: u32) -> Option<&str> {
        self.workspace_names
            .get(id as usize)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}
