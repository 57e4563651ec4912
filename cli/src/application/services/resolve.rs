//! Application service — resolve a user-supplied identifier to an instance.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::ComputeProvider;
use crate::application::services::list::list_managed;
use crate::domain::error::InstanceError;
use crate::domain::naming;
use crate::domain::RemoteInstance;

/// How strictly an instance fetched by raw provider ID is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Accept any instance the provider returns for the ID.
    AnyInstance,
    /// Reject instances that carry neither the metadata flag nor the prefix.
    ManagedOnly,
}

/// Resolve `identifier` to a remote instance.
///
/// Precedence: a prefixed name is matched exactly against the managed list;
/// an unprefixed name is prefixed and matched the same way; otherwise the
/// identifier is fetched as a provider ID.
///
/// # Errors
///
/// Returns [`InstanceError::NotFound`] when nothing matches,
/// [`InstanceError::NotManaged`] when `policy` is `ManagedOnly` and the
/// ID-fetched instance is not managed, or a provider error if listing fails.
pub async fn resolve_instance(
    provider: &impl ComputeProvider,
    identifier: &str,
    policy: ResolutionPolicy,
) -> Result<RemoteInstance> {
    let candidate = if naming::has_prefix(identifier) {
        identifier.to_string()
    } else {
        naming::full_name(identifier)
    };

    if let Some(found) = list_managed(provider)
        .await?
        .into_iter()
        .find(|i| i.name == candidate)
    {
        tracing::debug!(%identifier, id = %found.id, "resolved by name");
        return Ok(found);
    }

    let fetched = match provider.get_instance(identifier).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::debug!(%identifier, error = %format!("{e:#}"), "lookup by ID failed");
            None
        }
    };
    let instance = fetched.ok_or_else(|| InstanceError::NotFound(identifier.to_string()))?;

    if policy == ResolutionPolicy::ManagedOnly && !instance.is_managed() {
        return Err(InstanceError::NotManaged(identifier.to_string()).into());
    }
    tracing::debug!(%identifier, name = %instance.name, "resolved by ID");
    Ok(instance)
}
