use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variable holding the CWA open-data API key.
pub const API_KEY_ENV: &str = "CWA_API_KEY";

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:3000".to_string() }
    }
}

/// Central Weather Administration open-data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CwaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    /// County-level one-week forecast.
    pub dataset: String,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for CwaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://opendata.cwa.gov.tw/api/v1/rest/datastore".to_string(),
            dataset: "F-D0047-091".to_string(),
            cache_ttl_secs: 600,
            timeout_secs: 10,
        }
    }
}

impl CwaConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// IP geolocation (ip-api.com) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub base_url: String,
    pub lang: String,
    pub timeout_secs: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ip-api.com/json".to_string(),
            lang: "zh-TW".to_string(),
            timeout_secs: 5,
        }
    }
}

impl GeoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [server]
/// bind = "127.0.0.1:8080"
///
/// [cwa]
/// api_key = "CWA-..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cwa: CwaConfig,
    pub geo: GeoConfig,
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.cwa.api_key = Some(api_key);
    }

    /// API key from the environment, falling back to the config file.
    ///
    /// A missing key is not an error: the server still runs and serves
    /// synthetic defaults.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    pub fn api_key_with_env(&self, env_value: Option<String>) -> Option<String> {
        let non_blank = |key: String| {
            let key = key.trim().to_string();
            (!key.is_empty()).then_some(key)
        };
        env_value.and_then(non_blank).or_else(|| self.cwa.api_key.clone().and_then(non_blank))
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "pixel-weather", "pixel-weather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
