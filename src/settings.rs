use crate::CONFY_APP_NAME;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub fov_degrees: f32,
    pub far_plane: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            far_plane: 1000.0,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "display").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store(CONFY_APP_NAME, "display", self);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    pub show_help: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { show_help: true }
    }
}

impl UiSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "ui").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store(CONFY_APP_NAME, "ui", self);
    }
}

// Aggregate struct for convenience
pub struct Settings {
    pub display: DisplaySettings,
    pub ui: UiSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            display: DisplaySettings::load(),
            ui: UiSettings::load(),
        }
    }
}
