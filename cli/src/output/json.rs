//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the renderer for command results.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::services::create::{CreateOutcome, Readiness};
use crate::application::services::terminate::{TerminateAllOutcome, Terminated};
use crate::domain::RemoteInstance;
use crate::domain::error::{ConfigError, InstanceError, KeyError, ProviderError};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for the outermost typed error in the chain.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return match e {
                ConfigError::MissingPassword | ConfigError::MissingField { .. } => {
                    "config_missing"
                }
                ConfigError::Unreadable { .. } | ConfigError::Malformed { .. } => {
                    "config_invalid"
                }
            };
        }
        if let Some(e) = cause.downcast_ref::<ProviderError>() {
            return match e {
                ProviderError::Authentication(_) => "authentication_failed",
                ProviderError::ResourceNotFound { .. } => "resource_not_found",
                _ => "provider_error",
            };
        }
        if let Some(e) = cause.downcast_ref::<KeyError>() {
            return match e {
                KeyError::AlreadyExists(_) => "key_exists",
                KeyError::Generate(_) | KeyError::Encode(_) => "key_error",
            };
        }
        if let Some(e) = cause.downcast_ref::<InstanceError>() {
            return match e {
                InstanceError::NotFound(_) => "instance_not_found",
                InstanceError::NotManaged(_) => "instance_not_managed",
                InstanceError::KeyNotCreatedHere { .. } | InstanceError::KeyDeleted { .. } => {
                    "key_missing"
                }
                InstanceError::SelectionCancelled => "cancelled",
                _ => "instance_error",
            };
        }
    }
    "error"
}

#[derive(Serialize)]
struct InstanceView<'a> {
    id: &'a str,
    name: &'a str,
    short_name: &'a str,
    status: &'a str,
    address: Option<&'a str>,
    created: Option<String>,
}

impl<'a> InstanceView<'a> {
    fn new(instance: &'a RemoteInstance) -> Self {
        Self {
            id: &instance.id,
            name: &instance.name,
            short_name: crate::domain::naming::short_name(&instance.name),
            status: instance.status.as_str(),
            address: instance.connection_address(),
            created: instance.created.map(|c| c.to_rfc3339()),
        }
    }
}

fn readiness_str(readiness: &Readiness) -> &'static str {
    match readiness {
        Readiness::Active => "active",
        Readiness::Failed => "error",
        Readiness::TimedOut => "timed_out",
        Readiness::Cancelled => "cancelled",
        Readiness::Unavailable(_) => "unavailable",
        Readiness::Skipped => "skipped",
    }
}

/// Renders command results as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    fn print(value: &serde_json::Value) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }

    /// Render the `list` result as an array.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_instances(instances: &[RemoteInstance]) -> Result<()> {
        let views: Vec<InstanceView<'_>> = instances.iter().map(InstanceView::new).collect();
        Self::print(&serde_json::to_value(views).context("JSON serialization failed")?)
    }

    /// Render the `create` result.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_created(outcome: &CreateOutcome) -> Result<()> {
        let instance = outcome.current.as_ref().unwrap_or(&outcome.created);
        Self::print(&serde_json::json!({
            "instance": InstanceView::new(instance),
            "generated_name": outcome.generated_name,
            "private_key": outcome.keys.private_key_path,
            "public_key": outcome.keys.public_key_path,
            "readiness": readiness_str(&outcome.readiness),
        }))
    }

    /// Render a single `terminate` result.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_terminated(done: &Terminated) -> Result<()> {
        Self::print(&terminated_view(done))
    }

    /// Render the `terminate --all` summary.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_terminate_all(outcome: &TerminateAllOutcome) -> Result<()> {
        let terminated: Vec<serde_json::Value> =
            outcome.terminated.iter().map(terminated_view).collect();
        let failed: Vec<serde_json::Value> = outcome
            .failed
            .iter()
            .map(|f| serde_json::json!({ "id": f.id, "name": f.name, "reason": f.reason }))
            .collect();
        Self::print(&serde_json::json!({
            "found": outcome.found.len(),
            "terminated": terminated,
            "failed": failed,
        }))
    }

    /// Render the CLI version.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(version: &str) -> Result<()> {
        Self::print(&serde_json::json!({ "version": version }))
    }
}

fn terminated_view(done: &Terminated) -> serde_json::Value {
    serde_json::json!({
        "id": done.identity.provider_id,
        "name": done.identity.full_name,
        "short_name": done.identity.short_name,
        "keypair_removed": done.keypair_removed,
        "local_keys_removed": done.local_keys_removed,
    })
}
