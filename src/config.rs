//! # Configuration Module
//!
//! Tunables for setlist generation: the service moments and how many songs
//! each needs, recency decay, default tag weight, and energy ordering.
//!
//! The engine itself never reads files. Callers either build a
//! [`GenerationConfig`] in code or load one from JSON with [`load_config`].
//! Every field is optional in the file; missing ones take the defaults.
//!
//! ```json
//! {
//!   "moments": { "prelúdio": 1, "louvor": 4, "poslúdio": 1 },
//!   "decay_days": 30,
//!   "energy_ordering_rules": { "louvor": "ascending" }
//! }
//! ```
//!
//! ## Config Location
//!
//! [`get_config_path`] returns the platform-standard location:
//! - Linux: `~/.config/setlister/config.json`
//! - macOS: `~/Library/Application Support/setlister/config.json`
//! - Windows: `%APPDATA%\setlister\config.json`

use crate::error::ValidationError;
use crate::ordering::{EnergyDirection, EnergySettings, DEFAULT_ENERGY};
use crate::recency::DEFAULT_DECAY_DAYS;
use crate::setlist::MomentConfig;
use crate::tags::{MAX_WEIGHT, MIN_WEIGHT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Weight given to a bare tag with no explicit `(weight)`.
pub const DEFAULT_WEIGHT: u8 = 3;

/// Service moments in order, with the number of songs each requires.
#[must_use]
pub fn default_moments() -> MomentConfig {
    [
        ("prelúdio", 1),
        ("ofertório", 1),
        ("saudação", 1),
        ("crianças", 1),
        ("louvor", 4),
        ("poslúdio", 1),
    ]
    .into_iter()
    .map(|(moment, count)| (moment.to_string(), count))
    .collect()
}

/// Everything the generator can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub moments: MomentConfig,
    pub decay_days: u32,
    pub default_weight: u8,
    pub energy_ordering_enabled: bool,
    pub energy_ordering_rules: HashMap<String, EnergyDirection>,
    pub default_energy: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            moments: default_moments(),
            decay_days: DEFAULT_DECAY_DAYS,
            default_weight: DEFAULT_WEIGHT,
            energy_ordering_enabled: true,
            energy_ordering_rules: HashMap::from([(
                "louvor".to_string(),
                EnergyDirection::Ascending,
            )]),
            default_energy: DEFAULT_ENERGY,
        }
    }
}

impl GenerationConfig {
    /// Same tunables with a different moment layout, e.g. an event type's.
    #[must_use]
    pub fn with_moments(&self, moments: MomentConfig) -> Self {
        Self {
            moments,
            ..self.clone()
        }
    }

    /// The energy ordering tunables as the sequencer expects them.
    #[must_use]
    pub fn energy_settings(&self) -> EnergySettings {
        EnergySettings {
            enabled: self.energy_ordering_enabled,
            rules: self.energy_ordering_rules.clone(),
            default_energy: self.default_energy,
        }
    }

    /// Checks moment counts and the default weight.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidMomentCount`] for a zero count,
    /// [`ValidationError::InvalidTagWeight`] for a default weight outside 1-10.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_moments(&self.moments)?;
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&self.default_weight) {
            return Err(ValidationError::InvalidTagWeight {
                token: format!("default_weight = {}", self.default_weight),
                reason: "weight must be an integer between 1 and 10".to_string(),
            });
        }
        Ok(())
    }
}

/// Every moment must require at least one song.
///
/// # Errors
///
/// [`ValidationError::InvalidMomentCount`] naming the first offending moment.
pub fn validate_moments(moments: &MomentConfig) -> Result<(), ValidationError> {
    match moments.iter().find(|&(_, &count)| count == 0) {
        Some((moment, &count)) => Err(ValidationError::InvalidMomentCount {
            moment: moment.clone(),
            count,
        }),
        None => Ok(()),
    }
}

/// Returns the platform-appropriate config file path.
///
/// The file itself is not created; only the `setlister` directory is.
///
/// # Errors
///
/// This function will return an error if:
/// - The system config directory cannot be determined
/// - The setlister subdirectory cannot be created due to permissions
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Please ensure your platform supports standard config directories."
        )
    })?;

    let setlister_dir = config_dir.join("setlister");
    fs::create_dir_all(&setlister_dir).with_context(|| {
        format!(
            "Failed to create setlister config directory at {}. Please check file permissions.",
            setlister_dir.display()
        )
    })?;

    Ok(setlister_dir.join("config.json"))
}

/// Loads and validates a config file.
///
/// # Errors
///
/// Fails when the file cannot be read, is not valid JSON for
/// [`GenerationConfig`], or does not pass [`GenerationConfig::validate`].
pub fn load_config(path: &Path) -> Result<GenerationConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: GenerationConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    log::debug!("Loaded generation config from {}", path.display());
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults.
///
/// # Errors
///
/// Same as [`load_config`] for a file that exists.
pub fn load_config_or_default(path: &Path) -> Result<GenerationConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::debug!("No config at {}, using defaults", path.display());
        Ok(GenerationConfig::default())
    }
}

/// Writes `config` as pretty JSON.
///
/// # Errors
///
/// Fails when the file cannot be written.
pub fn save_config(config: &GenerationConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write config file {}", path.display()))
}
