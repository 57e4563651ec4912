//! Connection parameters for the compute provider.
//!
//! Pure functions only — no I/O, no async, no filesystem access. The loader in
//! `infra::config` reads the file and environment and hands the pieces to
//! [`resolve`].

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_DOMAIN_NAME: &str = "default";
pub const DEFAULT_FLAVOR_NAME: &str = "m1.small";
pub const DEFAULT_NETWORK_ATTACHMENT_MODE: &str = "existing_network";

// ── Raw sources ──────────────────────────────────────────────────────────────

/// Settings as read from a YAML file or from `OS_*` environment variables.
///
/// Every field is optional; the same shape is used for both sources so the
/// environment can be overlaid field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSource {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub domain_name: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub region_name: Option<String>,
    pub availability_zone: Option<String>,
    pub image_name: Option<String>,
    pub flavor_name: Option<String>,
    pub network_name: Option<String>,
    pub network_attachment_mode: Option<String>,
}

impl ConfigSource {
    /// Overlay `other` onto `self`: non-empty values in `other` win.
    #[must_use]
    pub fn overlay(self, other: Self) -> Self {
        fn pick(base: Option<String>, top: Option<String>) -> Option<String> {
            match top {
                Some(v) if !v.is_empty() => Some(v),
                _ => base,
            }
        }
        Self {
            auth_url: pick(self.auth_url, other.auth_url),
            username: pick(self.username, other.username),
            domain_name: pick(self.domain_name, other.domain_name),
            project_id: pick(self.project_id, other.project_id),
            project_name: pick(self.project_name, other.project_name),
            region_name: pick(self.region_name, other.region_name),
            availability_zone: pick(self.availability_zone, other.availability_zone),
            image_name: pick(self.image_name, other.image_name),
            flavor_name: pick(self.flavor_name, other.flavor_name),
            network_name: pick(self.network_name, other.network_name),
            network_attachment_mode: pick(
                self.network_attachment_mode,
                other.network_attachment_mode,
            ),
        }
    }
}

// ── Resolved config ──────────────────────────────────────────────────────────

/// Validated, immutable connection parameters for one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub domain_name: String,
    pub project_id: String,
    pub project_name: String,
    pub region_name: String,
    pub availability_zone: String,
    pub image_name: String,
    pub flavor_name: String,
    pub network_name: String,
    pub network_attachment_mode: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain_name", &self.domain_name)
            .field("project_id", &self.project_id)
            .field("project_name", &self.project_name)
            .field("region_name", &self.region_name)
            .field("availability_zone", &self.availability_zone)
            .field("image_name", &self.image_name)
            .field("flavor_name", &self.flavor_name)
            .field("network_name", &self.network_name)
            .field("network_attachment_mode", &self.network_attachment_mode)
            .finish()
    }
}

/// Apply defaults and validate.
///
/// `merged` is the file source with the environment already overlaid.
/// `password` comes from `OS_PASSWORD` only.
///
/// # Errors
///
/// Returns [`ConfigError::MissingPassword`] when no password is given, or
/// [`ConfigError::MissingField`] naming the first empty required setting.
pub fn resolve(merged: ConfigSource, password: Option<String>) -> Result<ProviderConfig, ConfigError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(ConfigError::MissingPassword)?;

    let required = |value: Option<String>, key: &'static str| {
        value
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingField { key })
    };
    let or_default = |value: Option<String>, default: &str| {
        value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let auth_url = required(merged.auth_url, "OS_AUTH_URL")?;
    let username = required(merged.username, "OS_USERNAME")?;
    let project_id = required(merged.project_id, "OS_PROJECT_ID")?;
    let project_name = required(merged.project_name, "OS_PROJECT_NAME")?;
    let region_name = required(merged.region_name, "OS_REGION_NAME")?;
    let availability_zone = required(merged.availability_zone, "OS_AVAILABILITY_ZONE")?;
    let image_name = required(merged.image_name, "OS_IMAGE_NAME")?;
    let network_name = required(merged.network_name, "OS_NETWORK_NAME")?;

    Ok(ProviderConfig {
        auth_url,
        username,
        password,
        domain_name: or_default(merged.domain_name, DEFAULT_DOMAIN_NAME),
        project_id,
        project_name,
        region_name,
        availability_zone,
        image_name,
        flavor_name: or_default(merged.flavor_name, DEFAULT_FLAVOR_NAME),
        network_name,
        network_attachment_mode: or_default(
            merged.network_attachment_mode,
            DEFAULT_NETWORK_ATTACHMENT_MODE,
        ),
    })
}
