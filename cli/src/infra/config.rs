//! Loads provider configuration from YAML and `OS_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::config::{self, ConfigSource, ProviderConfig};
use crate::domain::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TINS_CONFIG";

/// Reads the YAML file (if any) and overlays the environment.
pub struct YamlConfigLoader {
    explicit: Option<PathBuf>,
    cwd: PathBuf,
    home: Option<PathBuf>,
}

impl YamlConfigLoader {
    /// Loader using `$TINS_CONFIG`, the working directory and `$HOME`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            explicit: std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            home: dirs::home_dir(),
        }
    }

    /// Loader with every search root given explicitly (for testing).
    #[must_use]
    pub fn with_roots(explicit: Option<PathBuf>, cwd: PathBuf, home: Option<PathBuf>) -> Self {
        Self {
            explicit,
            cwd,
            home,
        }
    }

    /// Candidate config files, highest priority first.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.explicit {
            return vec![path.clone()];
        }
        let mut paths = vec![self.cwd.join(".config").join("tins.yaml")];
        if let Some(home) = &self.home {
            paths.push(home.join(".config").join("tins").join("tins.yaml"));
        }
        paths
    }

    /// The first candidate that exists.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|p| p.is_file())
    }

    /// Resolve configuration from the file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a required
    /// setting is missing.
    pub fn load(&self) -> Result<ProviderConfig> {
        self.load_with_env(std::env::vars())
    }

    /// Resolve configuration from the file and the given environment.
    ///
    /// # Errors
    ///
    /// Same as [`YamlConfigLoader::load`].
    pub fn load_with_env(
        &self,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Result<ProviderConfig> {
        let env: Vec<(String, String)> = env.into_iter().collect();

        let file = match self.path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                read_file(&path)?
            }
            None => {
                tracing::debug!("no config file found, using environment only");
                ConfigSource::default()
            }
        };

        let overlay: ConfigSource = envy::prefixed("OS_")
            .from_iter(env.iter().cloned())
            .map_err(|e| anyhow::anyhow!("invalid OS_* environment: {e}"))?;
        let password = env
            .iter()
            .find(|(k, _)| k == "OS_PASSWORD")
            .map(|(_, v)| v.clone());

        Ok(config::resolve(file.overlay(overlay), password)?)
    }
}

impl Default for YamlConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<ConfigSource, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if content.trim().is_empty() {
        return Ok(ConfigSource::default());
    }
    serde_yaml::from_str(&content).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
