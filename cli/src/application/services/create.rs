//! Application service — create an instance with its key pair.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    ComputeProvider, InstanceRequest, KeyPair, KeyStore, ProgressReporter,
};
use crate::domain::error::InstanceError;
use crate::domain::naming::{MANAGED_METADATA_KEY, MANAGED_METADATA_VALUE};
use crate::domain::{InstanceIdentity, InstanceStatus, RemoteInstance, names, ssh};

/// Interval between readiness checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default overall readiness timeout.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Names of the provider resources an instance is launched from.
#[derive(Debug, Clone)]
pub struct LaunchTarget<'a> {
    pub image_name: &'a str,
    pub flavor_name: &'a str,
    pub network_name: &'a str,
    pub availability_zone: &'a str,
}

/// Readiness polling parameters.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl WaitPolicy {
    #[must_use]
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            interval: POLL_INTERVAL,
            timeout,
            cancel,
        }
    }
}

pub struct CreateOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    /// User-supplied short name. A name is generated when `None`.
    pub name: Option<&'a str>,
    pub target: LaunchTarget<'a>,
    /// `None` skips the readiness poll.
    pub wait: Option<WaitPolicy>,
}

/// How the readiness poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Active,
    /// The instance reported `ERROR`.
    Failed,
    TimedOut,
    Cancelled,
    /// The instance could not be fetched while polling.
    Unavailable(String),
    /// Polling was disabled.
    Skipped,
}

/// Outcome of the `create_instance` use-case.
#[derive(Debug)]
pub struct CreateOutcome {
    pub identity: InstanceIdentity,
    /// `true` when the short name was generated rather than supplied.
    pub generated_name: bool,
    pub keys: KeyPair,
    /// The instance as first reported by the create call.
    pub created: RemoteInstance,
    pub readiness: Readiness,
    /// The instance re-fetched after polling, when the fetch succeeded.
    pub current: Option<RemoteInstance>,
}

impl CreateOutcome {
    /// Address to connect to, from the freshest view of the instance.
    #[must_use]
    pub fn connection_address(&self) -> Option<&str> {
        self.current
            .as_ref()
            .unwrap_or(&self.created)
            .connection_address()
    }
}

/// Create a managed instance.
///
/// Order: local key pair, remote keypair, instance, readiness poll, re-fetch.
/// Any failure after the local key pair exists rolls back every side effect
/// already applied, best-effort, before the error is returned. Readiness
/// problems are reported as warnings and do not fail the call.
///
/// # Errors
///
/// Returns an error if name generation, key generation, keypair
/// registration, name resolution, or instance creation fails.
pub async fn create_instance(
    provider: &impl ComputeProvider,
    keys: &impl KeyStore,
    opts: CreateOptions<'_, impl ProgressReporter>,
) -> Result<CreateOutcome> {
    let CreateOptions {
        reporter,
        name,
        target,
        wait,
    } = opts;

    let (short_name, generated_name) = match name.filter(|n| !n.is_empty()) {
        Some(n) => (n.to_string(), false),
        None => {
            let n = names::generate_name().context("failed to generate instance name")?;
            reporter.step(&format!("generated instance name: {n}"));
            (n, true)
        }
    };
    let identity = InstanceIdentity::from_short_name(&short_name);

    reporter.step(&format!("generating SSH key pair for {}...", identity.full_name));
    let key_pair = keys
        .generate(&identity)
        .context("failed to generate SSH key")?;
    reporter.success(&format!(
        "SSH key pair created: {}",
        key_pair.private_key_path.display()
    ));

    reporter.step(&format!("registering keypair {}...", identity.full_name));
    if let Err(e) = provider
        .create_keypair(&identity.full_name, &key_pair.public_key)
        .await
    {
        rollback_local_keys(keys, &identity, reporter);
        return Err(e.context("failed to register keypair"));
    }

    reporter.step(&format!("creating instance {}...", identity.full_name));
    let created = match launch(provider, &identity, &key_pair, &target).await {
        Ok(created) => created,
        Err(e) => {
            rollback_keypair(provider, &identity, reporter).await;
            rollback_local_keys(keys, &identity, reporter);
            return Err(e.context("failed to create instance"));
        }
    };
    reporter.success(&format!(
        "instance created: {} (ID: {}, status: {})",
        created.name, created.id, created.status
    ));
    let identity = identity.with_provider_id(&created.id);

    let readiness = match wait {
        Some(policy) => {
            reporter.step("waiting for instance to become active...");
            let readiness = wait_for_active(provider, &created.id, &policy).await;
            report_readiness(reporter, &readiness);
            readiness
        }
        None => Readiness::Skipped,
    };

    let current = match provider.get_instance(&created.id).await {
        Ok(current) => current,
        Err(e) => {
            tracing::warn!(id = %created.id, error = %format!("{e:#}"), "re-fetch after create failed");
            None
        }
    };

    Ok(CreateOutcome {
        identity,
        generated_name,
        keys: key_pair,
        created,
        readiness,
        current,
    })
}

async fn launch(
    provider: &impl ComputeProvider,
    identity: &InstanceIdentity,
    key_pair: &KeyPair,
    target: &LaunchTarget<'_>,
) -> Result<RemoteInstance> {
    let image_id = provider.resolve_image(target.image_name).await?;
    let flavor_id = provider.resolve_flavor(target.flavor_name).await?;
    let network_id = provider.resolve_network(target.network_name).await?;

    let request = InstanceRequest {
        name: identity.full_name.clone(),
        image_id,
        flavor_id,
        network_id,
        availability_zone: target.availability_zone.to_string(),
        metadata: HashMap::from([(
            MANAGED_METADATA_KEY.to_string(),
            MANAGED_METADATA_VALUE.to_string(),
        )]),
        user_data: ssh::startup_script(&key_pair.public_key),
        key_name: Some(identity.full_name.clone()),
    };
    provider.create_instance(&request).await
}

async fn rollback_keypair(
    provider: &impl ComputeProvider,
    identity: &InstanceIdentity,
    reporter: &impl ProgressReporter,
) {
    if let Err(e) = provider.delete_keypair(&identity.full_name).await {
        tracing::warn!(name = %identity.full_name, error = %format!("{e:#}"), "keypair rollback failed");
        reporter.warn(&format!("failed to delete keypair {}: {e}", identity.full_name));
    }
}

fn rollback_local_keys(
    keys: &impl KeyStore,
    identity: &InstanceIdentity,
    reporter: &impl ProgressReporter,
) {
    if let Err(e) = keys.delete(identity) {
        tracing::warn!(name = %identity.full_name, error = %format!("{e:#}"), "local key rollback failed");
        reporter.warn(&format!("failed to clean up SSH key: {e}"));
    }
}

fn report_readiness(reporter: &impl ProgressReporter, readiness: &Readiness) {
    match readiness {
        Readiness::Active => reporter.success("instance is now ACTIVE"),
        Readiness::Failed => reporter.warn(&format!(
            "instance may not be ready yet: {}",
            InstanceError::EnteredErrorState
        )),
        Readiness::TimedOut => {
            reporter.warn("instance may not be ready yet: timed out waiting for ACTIVE");
        }
        Readiness::Cancelled => reporter.warn("stopped waiting; the instance is still being created"),
        Readiness::Unavailable(reason) => {
            reporter.warn(&format!("instance may not be ready yet: {reason}"));
        }
        Readiness::Skipped => {}
    }
}

/// Poll until the instance is `ACTIVE`, enters `ERROR`, the timeout elapses,
/// or `policy.cancel` fires. The first check happens one interval after the
/// call. A tick due at the deadline still gets its check.
pub async fn wait_for_active(
    provider: &impl ComputeProvider,
    id: &str,
    policy: &WaitPolicy,
) -> Readiness {
    // A timeout too large to represent means no deadline.
    let deadline = Instant::now().checked_add(policy.timeout);
    let mut ticker = tokio::time::interval_at(Instant::now() + policy.interval, policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = policy.cancel.cancelled() => return Readiness::Cancelled,
            _ = ticker.tick() => {}
            () = sleep_until_or_forever(deadline) => return Readiness::TimedOut,
        }

        match provider.get_instance(id).await {
            Ok(Some(instance)) => match instance.status {
                InstanceStatus::Active => return Readiness::Active,
                InstanceStatus::Error => return Readiness::Failed,
                status => tracing::debug!(%id, %status, "instance not ready"),
            },
            Ok(None) => return Readiness::Unavailable(format!("instance {id} no longer exists")),
            Err(e) => return Readiness::Unavailable(format!("{e:#}")),
        }
    }
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
