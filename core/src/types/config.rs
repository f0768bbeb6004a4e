//! Map and decoration settings, loaded from `grovemap.yaml` in the config dir.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "grovemap.yaml";


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    /// Map image width in pixels. Default: 9000.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Map image height in pixels. Default: 7004.
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: i32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: i32,
    /// Markers file, resolved relative to the config dir when not absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers_path: Option<String>,
    #[serde(default)]
    pub decor: DecorSettings,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorSettings {
    /// Name of the persisted cooldown slot file inside the config dir.
    #[serde(default = "default_slot_name")]
    pub slot_name: String,
    /// Cooldown applied by a decorate action. Default: 24 hours.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

fn default_width() -> u32 {
    9000
}

fn default_height() -> u32 {
    7004
}

fn default_min_zoom() -> i32 {
    -4
}

fn default_max_zoom() -> i32 {
    6
}

fn default_slot_name() -> String {
    "tree_decor_v1".to_string()
}

fn default_cooldown_ms() -> u64 {
    24 * 60 * 60 * 1000
}


impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            width: default_width(),
            height: default_height(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            markers_path: None,
            decor: DecorSettings::default(),
        }
    }
}

impl Default for DecorSettings {
    fn default() -> Self {
        DecorSettings {
            slot_name: default_slot_name(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}


impl MapSettings {
    /// Parse settings from YAML text. Missing fields fall back to defaults.
    pub fn from_yaml(input: &str) -> MapSettings {
        match serde_yaml::from_str(input) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("settings file unparseable, using defaults: {}", e);
                MapSettings::default()
            }
        }
    }

    /// Load settings from a file path. Returns defaults if the file doesn't
    /// exist or can't be read.
    pub fn from_file(path: &Path) -> MapSettings {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content),
            Err(_) => MapSettings::default(),
        }
    }
}
