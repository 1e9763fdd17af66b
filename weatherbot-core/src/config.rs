use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{error::ConfigError, report::Clock};

pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_WEATHER_BASE_URL: &str = "WEATHER_BASE_URL";
pub const ENV_WEATHER_LANG: &str = "WEATHER_LANG";
pub const ENV_WEATHER_TIMEOUT_SECS: &str = "WEATHER_TIMEOUT_SECS";
pub const ENV_WEATHER_CLOCK: &str = "WEATHER_CLOCK";
pub const ENV_WEATHER_MAX_IN_FLIGHT: &str = "WEATHER_MAX_IN_FLIGHT";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_LANGUAGE: &str = "uk";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// Weather provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Provider `lang` parameter.
    pub language: String,
    pub timeout_secs: u64,
    pub clock: Clock,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            clock: Clock::default(),
        }
    }
}

impl WeatherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Upper bound on lookups running at the same time.
    pub max_in_flight: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self { max_in_flight: DEFAULT_MAX_IN_FLIGHT }
    }
}

/// Process configuration, built once at startup.
///
/// Example TOML:
/// ```toml
/// telegram_token = "..."
///
/// [weather]
/// api_key = "..."
/// language = "uk"
/// clock = "location"
///
/// [dispatch]
/// max_in_flight = 8
/// ```
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub telegram_token: Option<String>,
    pub weather: WeatherSettings,
    pub dispatch: DispatchSettings,
}

impl Config {
    /// Load the config file (if any), then apply environment overrides.
    ///
    /// An explicit `path` must exist; the platform default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_file_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        cfg.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weatherbot", "weatherbot").ok_or(ConfigError::ConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override fields from variables returned by `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TELEGRAM_TOKEN) {
            self.telegram_token = Some(token);
        }
        if let Some(key) = lookup(ENV_WEATHER_API_KEY) {
            self.weather.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_WEATHER_BASE_URL) {
            self.weather.base_url = url;
        }
        if let Some(lang) = lookup(ENV_WEATHER_LANG) {
            self.weather.language = lang;
        }
        if let Some(raw) = lookup(ENV_WEATHER_TIMEOUT_SECS) {
            self.weather.timeout_secs = parse_number(ENV_WEATHER_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WEATHER_CLOCK) {
            self.weather.clock = Clock::try_from(raw.as_str()).map_err(|reason| {
                ConfigError::InvalidValue { key: ENV_WEATHER_CLOCK, reason }
            })?;
        }
        if let Some(raw) = lookup(ENV_WEATHER_MAX_IN_FLIGHT) {
            self.dispatch.max_in_flight = parse_number(ENV_WEATHER_MAX_IN_FLIGHT, &raw)?;
        }

        Ok(())
    }

    /// Check everything the bot needs before it starts receiving messages.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.telegram_token()?;
        self.weather_api_key()?;

        if self.weather.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "weather.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.dispatch.max_in_flight == 0 {
            return Err(ConfigError::InvalidValue {
                key: "dispatch.max_in_flight",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn telegram_token(&self) -> Result<&str, ConfigError> {
        non_blank(self.telegram_token.as_deref()).ok_or(ConfigError::MissingCredential(ENV_TELEGRAM_TOKEN))
    }

    pub fn weather_api_key(&self) -> Result<&str, ConfigError> {
        non_blank(self.weather.api_key.as_deref())
            .ok_or(ConfigError::MissingCredential(ENV_WEATHER_API_KEY))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &redact(self.telegram_token.as_deref()))
            .field("weather", &self.weather)
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

impl fmt::Debug for WeatherSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherSettings")
            .field("api_key", &redact(self.api_key.as_deref()))
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("timeout_secs", &self.timeout_secs)
            .field("clock", &self.clock)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn redact(value: Option<&str>) -> &'static str {
    match non_blank(value) {
        Some(_) => "<set>",
        None => "<missing>",
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue { key, reason: e.to_string() })
}
