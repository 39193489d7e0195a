//! Session Settings
//!
//! Configuration for one synchronization session. The host builds this once
//! when it opens a scene; nothing is read from the environment.
//!
//! ```rust,ignore
//! use hydra_core::SessionSettings;
//!
//! // Textures the asset backend cannot supply are fetched next to the scene file.
//! let settings = SessionSettings::from_source_file("https://example.com/assets/scene.usdz");
//! assert_eq!(settings.base_url.as_deref(), Some("https://example.com/assets"));
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bright pink used for prims whose material could not be resolved.
pub const MISSING_MATERIAL_COLOR: Vec3 = Vec3::new(1.0, 41.0 / 255.0, 151.0 / 255.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Identifying name of the scene, used to tag errors.
    pub scene_name: String,

    /// Root used for a direct fetch when the asset backend has no file.
    ///
    /// Either a directory path or an `http(s)://` URL.
    pub base_url: Option<String>,

    /// Base color of the missing-material sentinel.
    pub missing_material_color: Vec3,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scene_name: String::new(),
            base_url: None,
            missing_material_color: MISSING_MATERIAL_COLOR,
        }
    }
}

impl SessionSettings {
    /// Settings for a scene loaded from `file`, with the fallback root set to
    /// the directory that contains it.
    #[must_use]
    pub fn from_source_file(file: &str) -> Self {
        let base_url = file.rfind('/').map(|slash| file[..slash].to_string());
        Self {
            scene_name: file.to_string(),
            base_url,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_scene_name(mut self, scene_name: impl Into<String>) -> Self {
        self.scene_name = scene_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_parent_of_source_file() {
        let settings = SessionSettings::from_source_file("models/kitchen/scene.usda");
        assert_eq!(settings.base_url.as_deref(), Some("models/kitchen"));
        assert_eq!(settings.scene_name, "models/kitchen/scene.usda");
    }

    #[test]
    fn bare_file_name_has_no_base_url() {
        let settings = SessionSettings::from_source_file("scene.usda");
        assert_eq!(settings.base_url, None);
    }

    #[test]
    fn deserializes_partial_json() {
        let settings: SessionSettings =
            serde_json::from_str(r#"{ "scene_name": "kitchen", "base_url": "https://cdn.test/kitchen" }"#)
                .unwrap();
        assert_eq!(settings.scene_name, "kitchen");
        assert_eq!(settings.base_url.as_deref(), Some("https://cdn.test/kitchen"));
        assert_eq!(settings.missing_material_color, MISSING_MATERIAL_COLOR);
    }
}
