//! Command implementations

pub mod connect;
pub mod create;
pub mod list;
pub mod terminate;
pub mod version;
