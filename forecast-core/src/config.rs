use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_PORT: u16 = 8000;

pub const ENV_PORT: &str = "PORT";
pub const ENV_API_KEY: &str = "STORMGLASS_API_KEY";
pub const ENV_BASE_URL: &str = "STORMGLASS_BASE_URL";

/// Read from the working directory; real environment variables take precedence.
pub const DOTENV_FILE: &str = ".env";

/// StormGlass credentials and endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Overrides `https://api.stormglass.io`; mostly useful in tests.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Server configuration, built once at startup.
///
/// Example TOML:
/// ```toml
/// port = 8080
///
/// [stormglass]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub stormglass: Option<ProviderConfig>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, stormglass: None }
    }
}

impl Config {
    /// Load from `path` if given, else from the platform config file, then
    /// apply `.env` and environment overrides.
    ///
    /// A missing platform file is fine; a missing explicit file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::config_file_path()?;
                if path.exists() { Self::from_file(&path)? } else { Self::default() }
            }
        };

        cfg.with_dotenv(Path::new(DOTENV_FILE))?
            .with_env(|key| std::env::var(key).ok())
    }

    /// Apply `KEY=value` pairs from a dotenv file. A missing file is skipped.
    pub fn with_dotenv(self, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(self);
        }

        let vars: HashMap<String, String> = dotenv::from_path_iter(path)
            .with_context(|| format!("Failed to read env file: {}", path.display()))?
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to parse env file: {}", path.display()))?;

        self.with_env(|key| vars.get(key).cloned())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Apply `PORT`, `STORMGLASS_API_KEY` and `STORMGLASS_BASE_URL` from `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT).filter(|p| !p.trim().is_empty()) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PORT} must be a port number, got '{port}'"))?;
        }

        if let Some(api_key) = lookup(ENV_API_KEY) {
            match self.stormglass.as_mut() {
                Some(provider) => provider.api_key = api_key,
                None => self.stormglass = Some(ProviderConfig { api_key, base_url: None }),
            }
        }

        if let (Some(base_url), Some(provider)) = (lookup(ENV_BASE_URL), self.stormglass.as_mut()) {
            provider.base_url = Some(base_url);
        }

        Ok(self)
    }

    /// The configured StormGlass key; blank keys count as missing.
    pub fn api_key(&self) -> Result<&str> {
        self.stormglass
            .as_ref()
            .map(|p| p.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "{ENV_API_KEY} is not set.\n\
                     Hint: export {ENV_API_KEY}=<key> or add [stormglass] api_key to {}.",
                    Self::config_file_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "config.toml".to_string())
                )
            })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.stormglass.as_ref().and_then(|p| p.base_url.as_deref())
    }

    /// Path to the platform config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "marine-forecast", "forecast-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
