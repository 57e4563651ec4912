//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod instance;
pub mod names;
pub mod naming;
pub mod ssh;

pub use config::{ConfigSource, ProviderConfig};
pub use error::{ConfigError, InstanceError, KeyError, NameError, ProviderError, ResourceKind};
pub use instance::{InstanceAddress, InstanceStatus, RemoteInstance};
pub use naming::InstanceIdentity;
