//! Runtime settings
//!
//! Settings are read once from the environment (after `.env` is loaded) and
//! handed to the game by value. A `reload` asks the game's [`ConfigSource`]
//! for a fresh copy and swaps it in.

use crate::command::MAX_NUMERIC_ARGS;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read text catalog {}: {source}", path.display())]
    CatalogIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed text catalog: {0}")]
    CatalogFormat(#[from] serde_json::Error),

    #[error("language {0:?} not found in text catalog")]
    UnknownLanguage(String),
}

/// The optional non-human filler player
#[derive(Debug, Clone, PartialEq)]
pub struct FillerSettings {
    pub name: String,
    pub active: bool,
}

impl Default for FillerSettings {
    fn default() -> Self {
        Self {
            name: "Rando Cardrissian".to_string(),
            active: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub language: String,
    pub channel: String,
    pub min_players: usize,
    pub max_players: usize,
    pub hand_size: usize,
    pub max_points: u32,
    pub card_dir: PathBuf,
    /// External text catalog; the bundled English one is used when unset
    pub text_file: Option<PathBuf>,
    pub filler: FillerSettings,
    /// Keep players' lifetime stats from one game to the next
    pub keep_history: bool,
    pub bind: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            channel: "#cards".to_string(),
            min_players: 3,
            max_players: 10,
            hand_size: 10,
            max_points: 5,
            card_dir: PathBuf::from("cards"),
            text_file: None,
            filler: FillerSettings::default(),
            keep_history: false,
            bind: SocketAddr::from(([0, 0, 0, 0], 6667)),
        }
    }
}

impl Settings {
    /// Load settings from `CARDBOT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let min_players = parse_or(&get, "CARDBOT_MIN_PLAYERS", defaults.min_players)?;
        let max_players = parse_or(&get, "CARDBOT_MAX_PLAYERS", defaults.max_players)?;

        let mut settings = Self {
            language: get("CARDBOT_LANGUAGE").unwrap_or(defaults.language),
            channel: get("CARDBOT_CHANNEL").unwrap_or(defaults.channel),
            min_players,
            max_players,
            hand_size: parse_or(&get, "CARDBOT_HAND_SIZE", defaults.hand_size)?,
            max_points: parse_or(&get, "CARDBOT_MAX_POINTS", defaults.max_points)?,
            card_dir: get("CARDBOT_CARD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.card_dir),
            text_file: get("CARDBOT_TEXT_FILE").map(PathBuf::from),
            filler: FillerSettings {
                name: get("CARDBOT_FILLER_NAME").unwrap_or(defaults.filler.name),
                active: parse_bool_or(&get, "CARDBOT_FILLER_ACTIVE", defaults.filler.active)?,
            },
            keep_history: parse_bool_or(&get, "CARDBOT_KEEP_HISTORY", defaults.keep_history)?,
            bind: parse_or(&get, "CARDBOT_BIND", defaults.bind)?,
        };

        if settings.min_players < 2 {
            tracing::warn!(
                "CARDBOT_MIN_PLAYERS={} is too small, using 2",
                settings.min_players
            );
            settings.min_players = 2;
        }
        if settings.max_players < settings.min_players {
            tracing::warn!(
                "CARDBOT_MAX_PLAYERS={} is below the minimum, using {}",
                settings.max_players,
                settings.min_players
            );
            settings.max_players = settings.min_players;
        }
        if settings.hand_size < MAX_NUMERIC_ARGS {
            tracing::warn!(
                "CARDBOT_HAND_SIZE={} can't cover every prompt, using {}",
                settings.hand_size,
                MAX_NUMERIC_ARGS
            );
            settings.hand_size = MAX_NUMERIC_ARGS;
        }
        if settings.max_points == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CARDBOT_MAX_POINTS",
                value: "0".to_string(),
            });
        }

        Ok(settings)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(value) => Err(ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

/// Where the game gets fresh settings from on `reload`
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<Settings, ConfigError>;
}

/// Reads settings from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigSource for EnvConfig {
    fn load(&self) -> Result<Settings, ConfigError> {
        Settings::from_env()
    }
}

/// Always hands back the same settings
#[derive(Debug, Clone)]
pub struct FixedConfig(pub Settings);

impl ConfigSource for FixedConfig {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.0.clone())
    }
}
