//! Instance naming: the `tins-` prefix, the managed-metadata marker, and the
//! short/full name identity derived from them.
//!
//! Pure functions only — no I/O.

use serde::Serialize;

/// Prefix carried by every instance and keypair this tool creates.
pub const INSTANCE_NAME_PREFIX: &str = "tins-";

/// Metadata key set to `"true"` on every instance this tool creates.
pub const MANAGED_METADATA_KEY: &str = "tins";

/// Value stored under [`MANAGED_METADATA_KEY`].
pub const MANAGED_METADATA_VALUE: &str = "true";

/// The names an instance is known by.
///
/// `full_name` is always `INSTANCE_NAME_PREFIX + short_name`, except for
/// instances adopted by raw provider ID whose remote name lacks the prefix;
/// those keep the remote name as both halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceIdentity {
    /// User-facing name without the prefix, e.g. `alpha`.
    pub short_name: String,
    /// Prefix-qualified name used for the remote instance and keypair.
    pub full_name: String,
    /// Provider-assigned ID, populated once the remote instance exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl InstanceIdentity {
    /// Identity for a short name that has no remote instance yet.
    #[must_use]
    pub fn from_short_name(short_name: &str) -> Self {
        Self {
            short_name: short_name.to_string(),
            full_name: full_name(short_name),
            provider_id: None,
        }
    }

    /// Identity reconstructed from a remote instance's own name.
    #[must_use]
    pub fn from_remote(name: &str, provider_id: &str) -> Self {
        let short_name = short_name(name);
        Self {
            short_name: short_name.to_string(),
            full_name: name.to_string(),
            provider_id: Some(provider_id.to_string()),
        }
    }

    /// Attach the provider ID once the remote instance exists.
    #[must_use]
    pub fn with_provider_id(mut self, id: &str) -> Self {
        self.provider_id = Some(id.to_string());
        self
    }
}

/// `tins-` + `short_name`.
#[must_use]
pub fn full_name(short_name: &str) -> String {
    format!("{INSTANCE_NAME_PREFIX}{short_name}")
}

/// Strip the prefix when present; names without it are returned unchanged.
#[must_use]
pub fn short_name(name: &str) -> &str {
    name.strip_prefix(INSTANCE_NAME_PREFIX).unwrap_or(name)
}

/// Returns `true` when `name` carries the tool's prefix.
#[must_use]
pub fn has_prefix(name: &str) -> bool {
    name.starts_with(INSTANCE_NAME_PREFIX)
}
