//! Error types for platform API calls.

use thiserror::Error;

/// Errors surfaced by the platform when the core asks it to act.
///
/// The dispatcher gives two of these variants special treatment:
/// [`ApiError::PermissionDenied`] during command execution becomes a fixed
/// "bot lacks permission" reply, and [`ApiError::NotFound`] from a reaction
/// attempt is swallowed (the message was deleted before we could react).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The platform refused the action because the bot itself lacks a
    /// permission in the origin.
    #[error("the platform denied the action: bot lacks permission")]
    PermissionDenied,

    /// The target of the action no longer exists (e.g. a deleted message).
    #[error("target not found")]
    NotFound,

    /// Any other transport or platform failure.
    #[error("platform call failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// Creates a transport-level error from any displayable cause.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }
}

/// Result type for platform API calls.
pub type ApiResult<T> = Result<T, ApiError>;
