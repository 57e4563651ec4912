//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;

use crate::domain::{InstanceIdentity, RemoteInstance};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Launch parameters for a new remote instance. IDs are already resolved.
#[derive(Debug, Clone)]
pub struct InstanceRequest {
    /// Prefix-qualified instance name.
    pub name: String,
    pub image_id: String,
    pub flavor_id: String,
    pub network_id: String,
    pub availability_zone: String,
    pub metadata: HashMap<String, String>,
    /// Cloud-init user data, plain text. Providers encode it as needed.
    pub user_data: String,
    /// Registered keypair to bind natively, when the provider supports it.
    pub key_name: Option<String>,
}

/// Local key pair locations plus the public key text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    /// OpenSSH-format public key line, e.g. `ssh-rsa AAAA... `.
    pub public_key: String,
}

// ── Compute Provider Port ─────────────────────────────────────────────────────

/// Compute API used by every lifecycle workflow.
///
/// One implementation per cloud. Services depend only on this trait.
#[allow(async_fn_in_trait)]
pub trait ComputeProvider {
    /// Resolve an image name to its ID. First match wins.
    async fn resolve_image(&self, name: &str) -> Result<String>;
    /// Resolve a flavor name to its ID. Exact name match only.
    async fn resolve_flavor(&self, name: &str) -> Result<String>;
    /// Resolve a network name to its ID. First match wins.
    async fn resolve_network(&self, name: &str) -> Result<String>;
    /// Create an instance and return it as first reported.
    async fn create_instance(&self, request: &InstanceRequest) -> Result<RemoteInstance>;
    /// All instances visible to the project, managed or not.
    async fn list_instances(&self) -> Result<Vec<RemoteInstance>>;
    /// Fetch one instance by provider ID. `Ok(None)` when it does not exist.
    async fn get_instance(&self, id: &str) -> Result<Option<RemoteInstance>>;
    async fn delete_instance(&self, id: &str) -> Result<()>;
    /// Import `public_key` as a keypair named `name`.
    async fn create_keypair(&self, name: &str, public_key: &str) -> Result<()>;
    async fn delete_keypair(&self, name: &str) -> Result<()>;
}

// ── Key Store Port ────────────────────────────────────────────────────────────

/// Local SSH key pair storage at deterministic per-instance paths.
pub trait KeyStore {
    /// Generate and write a fresh key pair for `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or either file cannot be written.
    fn generate(&self, identity: &InstanceIdentity) -> Result<KeyPair>;
    /// Remove both key files. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error for any filesystem failure other than not-found.
    fn delete(&self, identity: &InstanceIdentity) -> Result<()>;
    /// Private key path. Pure, no filesystem access.
    fn path(&self, identity: &InstanceIdentity) -> PathBuf;
    /// Whether the private key exists on disk.
    fn exists(&self, identity: &InstanceIdentity) -> bool;
}

// ── Selector Port ─────────────────────────────────────────────────────────────

/// Interactive pick-one-from-a-list prompt.
pub trait InstanceSelector {
    /// Returns the chosen index, or `None` when the user cancels.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be driven.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with inherited stdio and return its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
