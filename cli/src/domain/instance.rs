//! Mirror types for provider-side instances.
//!
//! Pure data only. These are rebuilt from the provider on every invocation and
//! never cached.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::naming::{self, InstanceIdentity, MANAGED_METADATA_KEY, MANAGED_METADATA_VALUE};

/// Provider-reported instance status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Build,
    Active,
    Error,
    Other(String),
}

impl From<String> for InstanceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "BUILD" => Self::Build,
            "ACTIVE" => Self::Active,
            "ERROR" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl From<InstanceStatus> for String {
    fn from(s: InstanceStatus) -> Self {
        s.as_str().to_string()
    }
}

impl InstanceStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Build => "BUILD",
            Self::Active => "ACTIVE",
            Self::Error => "ERROR",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One address attached to an instance on a given network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAddress {
    pub addr: String,
    #[serde(default)]
    pub version: Option<u8>,
    /// `fixed` or `floating` when the provider reports it.
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub kind: Option<String>,
}

/// A compute instance as the provider currently reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInstance {
    pub id: String,
    pub name: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Network name → addresses on that network.
    #[serde(default)]
    pub addresses: BTreeMap<String, Vec<InstanceAddress>>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl RemoteInstance {
    /// Managed when the metadata flag is set or the name carries the prefix.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        let flagged = self
            .metadata
            .get(MANAGED_METADATA_KEY)
            .is_some_and(|v| v == MANAGED_METADATA_VALUE);
        flagged || naming::has_prefix(&self.name)
    }

    /// Address to connect to: the first `fixed` or `floating` address,
    /// otherwise the first address of any type.
    #[must_use]
    pub fn connection_address(&self) -> Option<&str> {
        let all = || self.addresses.values().flatten();
        all()
            .find(|a| matches!(a.kind.as_deref(), Some("fixed" | "floating")))
            .or_else(|| all().next())
            .map(|a| a.addr.as_str())
    }

    /// Identity derived from the instance's own name.
    #[must_use]
    pub fn identity(&self) -> InstanceIdentity {
        InstanceIdentity::from_remote(&self.name, &self.id)
    }
}
