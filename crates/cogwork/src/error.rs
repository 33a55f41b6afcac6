//! Error types for the cogwork framework.

use thiserror::Error;

/// Errors from module lifecycle operations.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The module is not present in the manager's registry.
    #[error("module '{0}' is not loaded")]
    NotLoaded(String),
}

/// Errors from the persisted parameter store.
///
/// A lookup miss is a hard failure for the caller; the store never invents
/// defaults on `get`.
#[derive(Debug, Error)]
pub enum ParamError {
    /// No value stored under the requested key.
    #[error("parameter '{0}' not found")]
    NotFound(String),

    /// Reading or writing the snapshot file failed.
    #[error("parameter snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot (or one value in it) could not be (de)serialized.
    #[error("parameter snapshot codec failed: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Errors from command registry mutation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No command registered under the given name.
    #[error("command '{0}' is not registered")]
    UnknownCommand(String),
}
