//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: HTTP calls to the cloud,
//! process execution, filesystem access, and terminal prompts.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod keys;
pub mod openstack;
pub mod selector;
