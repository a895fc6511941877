//! # Plugin Settings
//!
//! Loaded once at startup from a TOML file. Every field has a default, so
//! an empty or missing file yields a working setup.
//!
//! ```toml
//! data_file = "plugins/PlayCrates/crates.toml"
//! key_match_policy = "enchantments"
//! default_reward_weight = 1.0
//!
//! [default_sound]
//! sound = "block.amethyst_block.chime"
//! volume = 1.0
//! pitch = 1.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use playcrates_core::{CrateError, CrateResult, KeyMatchPolicy, SoundCue, DEFAULT_WEIGHT};

/// Plugin-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where crate definitions are persisted.
    pub data_file: PathBuf,
    /// How presented credentials are compared to crate keys.
    pub key_match_policy: KeyMatchPolicy,
    /// Weight given to rewards added from a held item.
    pub default_reward_weight: f64,
    /// Reward sound given to newly created crates.
    pub default_sound: SoundCue,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("crates.toml"),
            key_match_policy: KeyMatchPolicy::default(),
            default_reward_weight: DEFAULT_WEIGHT,
            default_sound: SoundCue::default(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidConfig` on malformed TOML or invalid
    /// values.
    pub fn from_toml_str(text: &str) -> CrateResult<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| CrateError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path`, falling back to defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidConfig` if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: impl AsRef<Path>) -> CrateResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| CrateError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> CrateResult<()> {
        let weight = self.default_reward_weight;
        if !weight.is_finite() || weight < 0.0 {
            return Err(CrateError::InvalidConfig(format!(
                "default_reward_weight must be a non-negative number, got {weight}"
            )));
        }
        if self.default_sound.sound.is_empty() {
            return Err(CrateError::InvalidConfig(
                "default_sound.sound must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
