//! Spawn configuration loaded from `config/spawning.toml`.
use std::{fs, path::PathBuf};

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;

use crate::preferences::DEFAULT_SPECIES;

const CONFIG_PATH: &str = "config/spawning.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawSpawnConfig {
    #[serde(default)]
    characters: RawCharacterSection,
    #[serde(default)]
    telemetry: RawTelemetrySection,
    #[serde(default)]
    rng: RawRngSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawCharacterSection {
    randomize_characters: bool,
    default_species: String,
}

impl Default for RawCharacterSection {
    fn default() -> Self {
        Self {
            randomize_characters: false,
            default_species: DEFAULT_SPECIES.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTelemetrySection {
    capacity: usize,
    log_path: String,
}

impl Default for RawTelemetrySection {
    fn default() -> Self {
        Self {
            capacity: 64,
            log_path: "logs/spawn_history.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRngSection {
    seed: Option<u64>,
}

/// Spawn-wide flags, read once per spawn.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SpawnSettings {
    /// Ignore player profiles and roll random characters.
    pub randomize_characters: bool,
    pub default_species: String,
    pub telemetry_capacity: usize,
    /// `None` disables the on-disk spawn history.
    pub telemetry_log_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

impl SpawnSettings {
    pub fn load_or_default() -> Self {
        match fs::read_to_string(CONFIG_PATH) {
            Ok(data) => Self::from_toml_str(&data).unwrap_or_else(|err| {
                warn!(
                    target: "spawning",
                    "Failed to parse {} ({}). Falling back to defaults.", CONFIG_PATH, err
                );
                Self::default()
            }),
            Err(err) => {
                warn!(
                    target: "spawning",
                    "Failed to read {} ({}). Falling back to defaults.", CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(data: &str) -> Result<Self, String> {
        toml::from_str::<RawSpawnConfig>(data)
            .map(Self::from)
            .map_err(|err| err.to_string())
    }
}

impl Default for SpawnSettings {
    fn default() -> Self {
        RawSpawnConfig::default().into()
    }
}

impl From<RawSpawnConfig> for SpawnSettings {
    fn from(value: RawSpawnConfig) -> Self {
        let characters = value.characters;
        let telemetry = value.telemetry;

        let default_species = match characters.default_species.trim() {
            "" => DEFAULT_SPECIES.to_string(),
            species => species.to_string(),
        };
        let log_path = telemetry.log_path.trim();

        Self {
            randomize_characters: characters.randomize_characters,
            default_species,
            telemetry_capacity: telemetry.capacity.max(1),
            telemetry_log_path: (!log_path.is_empty()).then(|| PathBuf::from(log_path)),
            rng_seed: value.rng.seed,
        }
    }
}

/// Random source for species rolls, random profiles and spawn point picks.
#[derive(Resource, Debug, Clone)]
pub struct SpawnRng(pub StdRng);

impl SpawnRng {
    pub fn from_settings(settings: &SpawnSettings) -> Self {
        match settings.rng_seed {
            Some(seed) => Self::seeded(seed),
            None => Self(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SpawnRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
