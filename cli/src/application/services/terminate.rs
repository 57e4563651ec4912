//! Application service — terminate one or all managed instances.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Instance deletion is the primary effect and is fatal on failure; keypair
//! and local key cleanup only warn.

use anyhow::{Context, Result};

use crate::application::ports::{ComputeProvider, KeyStore, ProgressReporter};
use crate::application::services::list::list_managed;
use crate::application::services::resolve::{ResolutionPolicy, resolve_instance};
use crate::domain::{InstanceIdentity, RemoteInstance};

/// Outcome of a single termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminated {
    pub identity: InstanceIdentity,
    /// Remote keypair was deleted.
    pub keypair_removed: bool,
    /// Local key files were deleted (or were already absent).
    pub local_keys_removed: bool,
}

/// Per-instance failure recorded during `terminate --all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminateFailure {
    pub name: String,
    pub id: String,
    pub reason: String,
}

/// Outcome of `terminate_all`.
#[derive(Debug, Default)]
pub struct TerminateAllOutcome {
    /// Managed instances found before any deletion.
    pub found: Vec<RemoteInstance>,
    pub terminated: Vec<Terminated>,
    pub failed: Vec<TerminateFailure>,
}

/// Terminate the instance `identifier` resolves to.
///
/// Resolution accepts any instance the provider returns for a raw ID.
///
/// # Errors
///
/// Returns an error if the identifier cannot be resolved or the instance
/// cannot be deleted. Cleanup failures are reported through `reporter` only.
pub async fn terminate_instance(
    provider: &impl ComputeProvider,
    keys: &impl KeyStore,
    reporter: &impl ProgressReporter,
    identifier: &str,
) -> Result<Terminated> {
    let instance = resolve_instance(provider, identifier, ResolutionPolicy::AnyInstance).await?;
    terminate_resolved(provider, keys, reporter, &instance).await
}

/// Terminate every managed instance, one at a time.
///
/// A failure on one instance is recorded and the loop moves on. The orphan
/// keypair sweep runs afterwards.
///
/// # Errors
///
/// Returns an error only if the instance list cannot be fetched.
pub async fn terminate_all(
    provider: &impl ComputeProvider,
    keys: &impl KeyStore,
    reporter: &impl ProgressReporter,
) -> Result<TerminateAllOutcome> {
    let found = list_managed(provider).await?;
    Ok(terminate_listed(provider, keys, reporter, found).await)
}

/// Terminate exactly the instances in `found`, as listed earlier by the
/// caller, then run the orphan keypair sweep.
pub async fn terminate_listed(
    provider: &impl ComputeProvider,
    keys: &impl KeyStore,
    reporter: &impl ProgressReporter,
    found: Vec<RemoteInstance>,
) -> TerminateAllOutcome {
    let mut outcome = TerminateAllOutcome::default();

    for instance in &found {
        match terminate_resolved(provider, keys, reporter, instance).await {
            Ok(done) => outcome.terminated.push(done),
            Err(e) => {
                tracing::warn!(id = %instance.id, error = %format!("{e:#}"), "terminate failed");
                reporter.warn(&format!("{e:#}"));
                outcome.failed.push(TerminateFailure {
                    name: instance.name.clone(),
                    id: instance.id.clone(),
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    reporter.step("checking for orphaned keypairs...");
    match sweep_orphaned_keypairs(provider).await {
        Ok(()) => reporter.success("orphaned keypair cleanup completed"),
        Err(e) => reporter.warn(&format!("failed to clean up orphaned keypairs: {e:#}")),
    }

    outcome.found = found;
    outcome
}

async fn terminate_resolved(
    provider: &impl ComputeProvider,
    keys: &impl KeyStore,
    reporter: &impl ProgressReporter,
    instance: &RemoteInstance,
) -> Result<Terminated> {
    let identity = instance.identity();

    reporter.step(&format!(
        "terminating instance {} (ID: {})...",
        instance.name, instance.id
    ));
    provider
        .delete_instance(&instance.id)
        .await
        .with_context(|| format!("failed to delete instance {}", instance.name))?;
    reporter.success(&format!("instance {} terminated", instance.name));

    let keypair_removed = match provider.delete_keypair(&identity.full_name).await {
        Ok(()) => {
            reporter.success(&format!("keypair {} deleted", identity.full_name));
            true
        }
        Err(e) => {
            tracing::debug!(name = %identity.full_name, error = %format!("{e:#}"), "keypair delete failed");
            reporter.warn(&format!(
                "failed to delete keypair {} (it may not exist): {e}",
                identity.full_name
            ));
            false
        }
    };

    let local_keys_removed = match keys.delete(&identity) {
        Ok(()) => {
            reporter.success(&format!("local SSH keys for {} deleted", identity.short_name));
            true
        }
        Err(e) => {
            reporter.warn(&format!("failed to delete local SSH keys: {e:#}"));
            false
        }
    };

    Ok(Terminated {
        identity,
        keypair_removed,
        local_keys_removed,
    })
}

/// Remove `tins-` keypairs that have no matching instance.
// TODO: implement once `ComputeProvider` can list keypairs.
#[allow(clippy::unused_async)]
async fn sweep_orphaned_keypairs(_provider: &impl ComputeProvider) -> Result<()> {
    Ok(())
}
