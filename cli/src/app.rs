//! Application context — unified state passed to every command handler.
//!
//! Built once from the global flags. Provider configuration and the
//! authenticated client are created lazily by the commands that need them,
//! so `version` never touches the environment.

use anyhow::{Context, Result};

use crate::domain::ProviderConfig;
use crate::infra::config::YamlConfigLoader;
use crate::infra::openstack::OpenStackClient;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// JSON mode implies quiet so progress lines never mix with the
    /// document on stdout.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Resolve provider configuration from the config file and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or malformed, or a
    /// required setting is missing.
    pub fn config(&self) -> Result<ProviderConfig> {
        let loader = YamlConfigLoader::new();
        let config = loader.load()?;
        tracing::debug!(?config, "resolved provider configuration");
        Ok(config)
    }

    /// Load configuration and authenticate against the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or authentication fails.
    pub async fn provider(&self) -> Result<(ProviderConfig, OpenStackClient)> {
        let config = self.config()?;
        let client = OpenStackClient::authenticate(&config)
            .await
            .context("failed to connect to OpenStack")?;
        Ok((config, client))
    }
}
