use crate::api::models::UserId;
use crate::error::ConfigError;
use crate::utils::normalize_url;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub base_url: String,
    /// Signed-in driver; authentication itself happens elsewhere.
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            driver_id: None,
            token: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_path: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("driver-messages.toml"))
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::toml_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str::<AppState>(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::toml_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let normalized = normalize_url(&self.base_url);
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::BaseUrl { url: self.base_url.clone(), reason: "not set".into() });
        }
        Url::parse(&normalized).map_err(|e| ConfigError::BaseUrl { url: self.base_url.clone(), reason: e.to_string() })
    }

    pub fn driver(&self) -> Result<UserId, ConfigError> {
        match self.driver_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(UserId::from(id)),
            _ => Err(ConfigError::MissingDriver),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}
