use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::positions::{Observer, DEFAULT_BASE_URL, DEFAULT_MIN_INTERVAL};
use crate::roster::{Roster, SatelliteDescriptor};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid observer coordinates: {0}")]
    InvalidObserver(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub observer: Option<ObserverConfig>,
    #[serde(default)]
    pub satellites: Option<Vec<SatelliteDescriptor>>,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Prediction window requested from the upstream, in seconds.
    #[serde(default = "default_seconds")]
    pub seconds: u32,
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            seconds: default_seconds(),
            timeout: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_seconds() -> u32 {
    1
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(
        default = "default_min_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub min_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            min_interval: default_min_interval(),
        }
    }
}

fn default_min_interval() -> Duration {
    DEFAULT_MIN_INTERVAL
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    #[serde(default = "default_world_map")]
    pub world_map: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            world_map: default_world_map(),
        }
    }
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_world_map() -> PathBuf {
    PathBuf::from("world.svg")
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.default_observer()?;
        Ok(config)
    }

    /// Reads the optional config file, then applies `PORT` and
    /// `N2YO_API_KEY` from the environment.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(
            std::env::var("PORT").ok(),
            std::env::var("N2YO_API_KEY").ok(),
        )?;
        Ok(config)
    }

    pub fn apply_overrides(
        &mut self,
        port: Option<String>,
        api_key: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
            let host = self
                .web
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.web.bind = format!("{}:{}", host, port);
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.upstream.api_key = key;
        }
        Ok(())
    }

    pub fn roster(&self) -> Roster {
        match &self.satellites {
            Some(satellites) => Roster::new(satellites.clone()),
            None => Roster::default(),
        }
    }

    /// Observer used when a request does not name one. Falls back to 0,0,0.
    pub fn default_observer(&self) -> Result<Observer, ConfigError> {
        match &self.observer {
            Some(observer) => {
                Observer::from_coordinates(&observer.coordinates, Some(observer.altitude_m))
                    .ok_or_else(|| ConfigError::InvalidObserver(observer.coordinates.clone()))
            }
            None => Ok(Observer::default()),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
