use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{AppPaths, LoopConfig};
use serde::Deserialize;
use thiserror::Error;

use super::gameplay::{MessageDurations, SessionSettings};

pub(crate) const CONFIG_ENV_VAR: &str = "AIRPORT_CONFIG";
const CONFIG_FILE_NAME: &str = "game.json";

/// Player-tunable settings read from `config/game.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_tps: u32,
    pub(crate) starting_money: Option<u32>,
    pub(crate) npc_seed: Option<u64>,
    pub(crate) outcome_message_ms: u64,
    pub(crate) purchase_message_ms: u64,
    pub(crate) check_in_close_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            starting_money: None,
            npc_seed: None,
            outcome_message_ms: 2000,
            purchase_message_ms: 1500,
            check_in_close_ms: 2000,
        }
    }
}

impl GameConfig {
    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_width: self.window_width,
            window_height: self.window_height,
            target_tps: self.target_tps,
            ..LoopConfig::default()
        }
    }

    pub(crate) fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            starting_money: self.starting_money,
            npc_seed: self.npc_seed,
            durations: MessageDurations {
                outcome: Duration::from_millis(self.outcome_message_ms),
                purchase: Duration::from_millis(self.purchase_message_ms),
            },
            check_in_close_delay: Duration::from_millis(self.check_in_close_ms),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}' at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config '{path}': {field} {message}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        message: &'static str,
    },
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
}

/// `AIRPORT_CONFIG` wins; otherwise `<root>/config/game.json` when it exists; otherwise defaults.
pub(crate) fn load_game_config(
    paths: &AppPaths,
) -> Result<(GameConfig, Option<PathBuf>), ConfigError> {
    let path = match env::var(CONFIG_ENV_VAR) {
        Ok(value) => Some(PathBuf::from(value)),
        Err(env::VarError::NotPresent) => {
            let candidate = paths.config_dir.join(CONFIG_FILE_NAME);
            candidate.is_file().then_some(candidate)
        }
        Err(source) => {
            return Err(ConfigError::EnvVar {
                var: CONFIG_ENV_VAR,
                source,
            })
        }
    };
    let Some(path) = path else {
        return Ok((GameConfig::default(), None));
    };
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = parse_game_config(&path, &raw)?;
    Ok((config, Some(path)))
}

pub(crate) fn parse_game_config(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config: GameConfig =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                field: if field.is_empty() { ".".to_string() } else { field },
                source: error.into_inner(),
            }
        })?;
    validate(path, &config)?;
    Ok(config)
}

fn validate(path: &Path, config: &GameConfig) -> Result<(), ConfigError> {
    let invalid = |field, message| ConfigError::Invalid {
        path: path.to_path_buf(),
        field,
        message,
    };
    if config.window_width == 0 || config.window_height == 0 {
        return Err(invalid("window_width/window_height", "must be greater than zero"));
    }
    if config.target_tps == 0 {
        return Err(invalid("target_tps", "must be greater than zero"));
    }
    Ok(())
}
