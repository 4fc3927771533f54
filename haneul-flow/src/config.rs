use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{FlowError, Result};

pub const DEFAULT_SESSION_KEY: &str = "haneul_user";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;
pub const DEFAULT_STORAGE_PATH: &str = ".haneul/session.json";

/// Runtime settings shared by every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Storage slot holding the session flag.
    pub session_key: String,
    /// Delay between the login-required notice and the redirect to the auth page.
    #[serde(rename = "redirect_delay_ms", with = "millis")]
    pub redirect_delay: Duration,
    /// Where the file-backed session storage keeps its slots.
    pub storage_path: PathBuf,
    /// Optional JSON catalog replacing the built-in packages.
    pub catalog_path: Option<PathBuf>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            session_key: DEFAULT_SESSION_KEY.to_string(),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            catalog_path: None,
        }
    }
}

impl FlowConfig {
    /// Load the YAML file named by `HANEUL_CONFIG` (if any), then apply
    /// `HANEUL_*` environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("HANEUL_CONFIG") {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration file");
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(raw).map_err(|e| FlowError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Split out from [`FlowConfig::from_env`]
    /// so tests do not have to touch the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("HANEUL_SESSION_KEY") {
            self.session_key = key;
        }
        if let Some(delay) = lookup("HANEUL_REDIRECT_DELAY_MS") {
            let millis = delay.trim().parse::<u64>().map_err(|_| {
                FlowError::Config(format!("HANEUL_REDIRECT_DELAY_MS is not a number: {delay}"))
            })?;
            self.redirect_delay = Duration::from_millis(millis);
        }
        if let Some(path) = lookup("HANEUL_STORAGE_PATH") {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("HANEUL_CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(path));
        }
        debug!(config = ?self, "Configuration resolved");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_key.trim().is_empty() {
            return Err(FlowError::Config("session_key must not be empty".to_string()));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
