//! Application service — open an SSH session to a managed instance.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{
    CommandRunner, ComputeProvider, InstanceSelector, KeyStore, ProgressReporter,
};
use crate::application::services::list::list_managed;
use crate::application::services::resolve::{ResolutionPolicy, resolve_instance};
use crate::domain::error::InstanceError;
use crate::domain::{RemoteInstance, naming, ssh};

/// A managed instance ready to be reached over SSH.
#[derive(Debug, Clone)]
pub struct ConnectTarget {
    pub instance: RemoteInstance,
    pub address: String,
    pub key_path: PathBuf,
}

/// Selector row: `name | status | ip`.
#[must_use]
pub fn selector_row(instance: &RemoteInstance) -> String {
    format!(
        "{} | {} | {}",
        instance.name,
        instance.status,
        instance.connection_address().unwrap_or("N/A")
    )
}

/// Resolve what to connect to without starting SSH.
///
/// With an identifier, resolution is `ManagedOnly`. Without one, managed
/// instances are offered through `selector`.
///
/// # Errors
///
/// Returns an error when resolution or selection fails, the instance has no
/// address, or the local private key is missing.
pub async fn prepare_connection(
    provider: &impl ComputeProvider,
    keys: &impl KeyStore,
    selector: &impl InstanceSelector,
    identifier: Option<&str>,
) -> Result<ConnectTarget> {
    let instance = match identifier.filter(|i| !i.is_empty()) {
        Some(id) => resolve_instance(provider, id, ResolutionPolicy::ManagedOnly).await?,
        None => select_instance(provider, selector).await?,
    };

    let address = instance
        .connection_address()
        .ok_or_else(|| InstanceError::NoAddress(instance.name.clone()))?
        .to_string();

    let identity = instance.identity();
    let key_path = keys.path(&identity);
    if !keys.exists(&identity) {
        // Only prefixed names were ever given a key by this tool.
        let err = if naming::has_prefix(&instance.name) {
            InstanceError::KeyDeleted {
                path: key_path,
                short_name: identity.short_name,
            }
        } else {
            InstanceError::KeyNotCreatedHere { path: key_path }
        };
        return Err(err.into());
    }

    Ok(ConnectTarget {
        instance,
        address,
        key_path,
    })
}

/// Resolve the target and hand off to `ssh`.
///
/// # Errors
///
/// Returns an error if [`prepare_connection`] fails, `ssh` cannot be
/// started, or it exits with a non-zero status.
pub async fn connect(
    provider: &impl ComputeProvider,
    keys: &impl KeyStore,
    selector: &impl InstanceSelector,
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    identifier: Option<&str>,
    extra_args: &[String],
) -> Result<ConnectTarget> {
    let target = prepare_connection(provider, keys, selector, identifier).await?;

    reporter.step(&format!(
        "connecting to {} ({}) using key {}...",
        target.instance.name,
        target.address,
        target.key_path.display()
    ));

    let args = ssh::ssh_args(&target.key_path, &target.address, extra_args);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    tracing::debug!(?args, "running ssh");
    let status = runner
        .run_status("ssh", &arg_refs)
        .await
        .context("failed to start ssh")?;
    anyhow::ensure!(status.success(), "SSH connection failed: {status}");
    Ok(target)
}

async fn select_instance(
    provider: &impl ComputeProvider,
    selector: &impl InstanceSelector,
) -> Result<RemoteInstance> {
    let mut instances = list_managed(provider).await?;
    if instances.is_empty() {
        return Err(InstanceError::NothingToSelect.into());
    }
    let rows: Vec<String> = instances.iter().map(selector_row).collect();
    let index = selector
        .select("Select an instance", &rows)?
        .ok_or(InstanceError::SelectionCancelled)?;
    anyhow::ensure!(index < instances.len(), "selection out of range: {index}");
    Ok(instances.swap_remove(index))
}
