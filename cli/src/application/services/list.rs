//! Application service — list managed instances.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::ComputeProvider;
use crate::domain::RemoteInstance;

/// Managed instances, in provider order.
///
/// # Errors
///
/// Returns an error if the provider cannot list instances.
pub async fn list_managed(provider: &impl ComputeProvider) -> Result<Vec<RemoteInstance>> {
    let all = provider
        .list_instances()
        .await
        .context("failed to list instances")?;
    let total = all.len();
    let managed: Vec<RemoteInstance> = all.into_iter().filter(RemoteInstance::is_managed).collect();
    tracing::debug!(total, managed = managed.len(), "filtered instance list");
    Ok(managed)
}
