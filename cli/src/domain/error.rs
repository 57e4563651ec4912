//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while resolving connection parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable OS_PASSWORD is not set")]
    MissingPassword,

    #[error("{key} is required (set in config file or environment variable)")]
    MissingField { key: &'static str },

    #[error("Failed to read config file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

// ── Provider errors ───────────────────────────────────────────────────────────

/// Kind of named resource resolved to a provider ID before launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Flavor,
    Network,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Image => "image",
            Self::Flavor => "flavor",
            Self::Network => "network",
        })
    }
}

/// Errors reported by the compute provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to authenticate: {0}")]
    Authentication(String),

    #[error("{kind} '{name}' not found")]
    ResourceNotFound { kind: ResourceKind, name: String },

    #[error("No {service} endpoint in region '{region}'")]
    EndpointNotFound { service: &'static str, region: String },

    #[error("Failed to {operation}: HTTP {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to {operation}: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    #[error("Unexpected response to {operation}: {reason}")]
    UnexpectedResponse {
        operation: &'static str,
        reason: String,
    },
}

// ── Instance errors ───────────────────────────────────────────────────────────

/// Errors related to locating, inspecting, and reaching instances.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Instance '{0}' not found")]
    NotFound(String),

    #[error("Instance '{0}' is not managed by tins")]
    NotManaged(String),

    #[error("Instance entered ERROR state")]
    EnteredErrorState,

    #[error("No IP address found for instance {0}. It may still be booting.")]
    NoAddress(String),

    #[error(
        "SSH key not found at {}. The instance may have been created outside of this tool.",
        path.display()
    )]
    KeyNotCreatedHere { path: PathBuf },

    #[error(
        "SSH key {} was deleted. Terminate the instance with: tins terminate {short_name}",
        path.display()
    )]
    KeyDeleted { path: PathBuf, short_name: String },

    #[error("No instances available")]
    NothingToSelect,

    #[error("Cancelled by user")]
    SelectionCancelled,
}

// ── Naming and key errors ─────────────────────────────────────────────────────

/// Errors raised while generating an instance name.
#[derive(Debug, Error)]
pub enum NameError {
    #[error("Failed to read random source: {0}")]
    RandomSource(String),

    #[error("Word list is empty")]
    EmptyWordList,
}

/// Errors raised while generating key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Failed to generate private key: {0}")]
    Generate(String),

    #[error("Failed to encode key: {0}")]
    Encode(String),

    #[error("SSH key {} already exists. Terminate the instance using it or pick another name", .0.display())]
    AlreadyExists(PathBuf),
}
