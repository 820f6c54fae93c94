// src/horde/settings.rs
//! Horde configuration (`settings.ron`): seed, spawner profile, announcement, prototypes.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::core::SpawnerProfile;
use super::error::HordeError;

/// A spawnable mob template known to the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobPrototype {
    pub id: String,
    pub name: String,
}

/// Visual shake on an armed anchor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JitterSettings {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for JitterSettings {
    fn default() -> Self {
        Self { amplitude: 10.0, frequency: 4.0 }
    }
}

#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct HordeSettings {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub profile: SpawnerProfile,
    /// Start announcement; `{location}` is replaced by the nearest landmark.
    #[serde(default)]
    pub announcement: Option<String>,
    #[serde(default = "default_tables_path")]
    pub tables_path: String,
    /// Empty means the host accepts any spawn id.
    #[serde(default)]
    pub prototypes: Vec<MobPrototype>,
    #[serde(default = "default_one_shot_lifetime")]
    pub one_shot_lifetime_secs: f32,
    #[serde(default)]
    pub jitter: JitterSettings,
}

fn default_seed() -> u64 {
    1337
}
fn default_tables_path() -> String {
    "assets/horde/tables.ron".to_string()
}
fn default_one_shot_lifetime() -> f32 {
    2.0
}

impl Default for HordeSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            profile: SpawnerProfile::default(),
            announcement: None,
            tables_path: default_tables_path(),
            prototypes: Vec::new(),
            one_shot_lifetime_secs: default_one_shot_lifetime(),
            jitter: JitterSettings::default(),
        }
    }
}

impl HordeSettings {
    pub fn from_ron_str(src: &str) -> Result<Self, HordeError> {
        let settings: HordeSettings = ron::de::from_str(src).map_err(|e| HordeError::Ron(e.to_string()))?;
        settings.profile.throw.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, HordeError> {
        let src = fs::read_to_string(path)?;
        Self::from_ron_str(&src)
    }

    /// Load, or warn and fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                info!("Horde: loaded settings from '{}', seed={}", path.display(), settings.seed);
                settings
            }
            Err(err) => {
                warn!("Horde: using default settings, '{}' failed: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn prototype(&self, id: &str) -> Option<&MobPrototype> {
        self.prototypes.iter().find(|p| p.id == id)
    }

    pub fn knows(&self, id: &str) -> bool {
        self.prototypes.is_empty() || self.prototype(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_uses_source_defaults() {
        let s = HordeSettings::from_ron_str("(seed: 9)").unwrap();
        assert_eq!(s.seed, 9);
        assert_eq!(s.profile.throw.min_speed, 0.5);
        assert_eq!(s.profile.throw.max_distance, 4.0);
        assert_eq!(s.profile.end_cue.volume_db, -3.0);
        assert!(s.announcement.is_none());
        assert!(s.knows("Anything"));
    }

    #[test]
    fn invalid_throw_ranges_rejected() {
        let src = "(profile: (throw: (min_speed: 2.0, max_speed: 1.0, min_distance: 2.0, max_distance: 4.0)))";
        assert!(matches!(HordeSettings::from_ron_str(src), Err(HordeError::InvalidThrowParams(_))));
    }

    #[test]
    fn prototype_list_restricts_ids() {
        let src = r#"(prototypes: [(id: "MobMouse", name: "mouse")])"#;
        let s = HordeSettings::from_ron_str(src).unwrap();
        assert!(s.knows("MobMouse"));
        assert!(!s.knows("MobBear"));
    }

    #[test]
    fn missing_file_falls_back() {
        let s = HordeSettings::load_or_default("does/not/exist.ron");
        assert_eq!(s.seed, 1337);
    }
}
