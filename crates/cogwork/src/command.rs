//! Commands, their results, and their failure shapes.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use cogwork_core::ApiError;

use crate::context::CommandContext;
use crate::permission::PermissionPolicy;

// ============================================================================
// EmbedKind
// ============================================================================

pub(crate) const COLOR_GREEN: u32 = 0x2ECC71;
pub(crate) const COLOR_RED: u32 = 0xE74C3C;

/// Flavor of a reply embed: success, neutral information, or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    Ok,
    Info,
    Error,
}

impl EmbedKind {
    /// The kind's fixed color, or `None` for [`EmbedKind::Info`], which
    /// takes the invoking principal's highest-role color instead.
    pub(crate) fn fixed_color(self) -> Option<u32> {
        match self {
            Self::Ok => Some(COLOR_GREEN),
            Self::Info => None,
            Self::Error => Some(COLOR_RED),
        }
    }

    /// Title used when a result carries none of its own.
    pub(crate) fn default_title(self) -> &'static str {
        match self {
            Self::Ok => "ОК",
            Self::Info => "Инфо",
            Self::Error => "Ошибка",
        }
    }
}

// ============================================================================
// CommandResult
// ============================================================================

/// Outcome of one command execution, as rendered by the dispatcher.
///
/// Produced either by the command itself or by the dispatcher on one of its
/// failure paths. The two sub-flags get special treatment during rendering:
/// `args_error` appends a usage field to the reply, and `access_denied`
/// triggers the dispatcher's post-execution substitution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    /// Whether the invocation failed (drives the fallback reaction emoji).
    pub error: bool,
    /// The command received too few arguments.
    pub args_error: bool,
    /// The command decided the invoker may not do this.
    pub access_denied: bool,
    /// Embed flavor of the reply.
    pub kind: EmbedKind,
    /// Reply body; `None` renders nothing.
    pub message: Option<String>,
    /// Reply title; `None` falls back to the kind's default.
    pub title: Option<String>,
    /// Explicit color override; `None` lets the kind decide.
    pub color: Option<u32>,
}

impl CommandResult {
    fn new(error: bool, kind: EmbedKind) -> Self {
        Self {
            error,
            args_error: false,
            access_denied: false,
            kind,
            message: None,
            title: None,
            color: None,
        }
    }

    /// A success with no reply text (reaction only).
    pub fn ok() -> Self {
        Self::new(false, EmbedKind::Ok)
    }

    /// A neutral informational result.
    pub fn info() -> Self {
        Self::new(false, EmbedKind::Info)
    }

    /// A failure result.
    pub fn error() -> Self {
        Self::new(true, EmbedKind::Error)
    }

    /// A failure caused by too few arguments; the dispatcher appends the
    /// command's usage to the reply.
    pub fn args_error() -> Self {
        let mut result = Self::new(true, EmbedKind::Error);
        result.args_error = true;
        result.title = Some("Недостаточно аргументов!".to_string());
        result
    }

    /// An access-denied outcome decided by the command itself. The
    /// dispatcher rewrites the reply to a random refusal phrase.
    pub fn access_denied() -> Self {
        let mut result = Self::new(true, EmbedKind::Error);
        result.access_denied = true;
        result
    }

    /// Sets the reply body.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the reply title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overrides the embed color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
}

// ============================================================================
// CommandError
// ============================================================================

/// Failure of one command execution.
///
/// Only two shapes exist at the dispatch boundary: the platform refused an
/// action because the *bot* lacks a permission, and everything else. The
/// dispatcher renders the former as a fixed reply and the latter with its
/// full diagnostic chain.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The platform denied one of the command's actions.
    #[error("bot lacks a platform permission")]
    PlatformPermission(#[source] ApiError),

    /// Anything else the command body failed with.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ApiError> for CommandError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::PermissionDenied => Self::PlatformPermission(error),
            other => Self::Other(anyhow::Error::new(other)),
        }
    }
}

/// Result type returned by [`Command::execute`].
pub type CommandOutcome = Result<CommandResult, CommandError>;

// ============================================================================
// Command
// ============================================================================

/// A registered chat command.
///
/// Implementations declare their identity, usage strings, required
/// permission policy and execution mode; the dispatcher owns everything
/// else (lookup, gating, failure containment, rendering).
///
/// Platform calls inside `execute` can use `?` directly: `ApiError`
/// converts into [`CommandError`], routing permission denials to the fixed
/// "bot lacks permission" reply.
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// Registry key. Matching against typed input is case-insensitive on
    /// the input side, so keep the name lower-case.
    fn name(&self) -> &str;

    /// One-line human description, shown in usage replies.
    fn description(&self) -> &str;

    /// Positional-argument usage, e.g. `"<user> [reason]"`.
    fn args_usage(&self) -> &str {
        ""
    }

    /// Names of the `--flags` the command understands.
    fn keys_usage(&self) -> &[String] {
        &[]
    }

    /// Permission policy gating this command.
    fn permission(&self) -> &PermissionPolicy;

    /// Name of the owning module; used for bulk deregistration.
    fn module_name(&self) -> &str;

    /// Whether the dispatcher awaits the result (`true`) or detaches the
    /// execution and answers immediately (`false`).
    fn should_await(&self) -> bool {
        true
    }

    /// Runs the command.
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome;

    /// Usage line: `name [args] [key1/key2/...]`.
    fn detailed_name(&self) -> String {
        let mut name = self.name().to_string();
        if !self.args_usage().is_empty() {
            name.push(' ');
            name.push_str(self.args_usage());
        }
        if !self.keys_usage().is_empty() {
            name.push_str(&format!(" [{}]", self.keys_usage().join("/")));
        }
        name
    }
}

/// Shared handle to a registered command.
pub type SharedCommand = Arc<dyn Command>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        args: &'static str,
        keys: Vec<String>,
        permission: PermissionPolicy,
    }

    #[async_trait]
    impl Command for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn description(&self) -> &str {
            "probes things"
        }

        fn args_usage(&self) -> &str {
            self.args
        }

        fn keys_usage(&self) -> &[String] {
            &self.keys
        }

        fn permission(&self) -> &PermissionPolicy {
            &self.permission
        }

        fn module_name(&self) -> &str {
            "test"
        }

        async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome {
            Ok(CommandResult::ok())
        }
    }

    #[test]
    fn detailed_name_variants() {
        let bare = Probe {
            args: "",
            keys: vec![],
            permission: PermissionPolicy::AcceptAll,
        };
        assert_eq!(bare.detailed_name(), "probe");

        let full = Probe {
            args: "<target>",
            keys: vec!["force".into(), "quiet".into()],
            permission: PermissionPolicy::AcceptAll,
        };
        assert_eq!(full.detailed_name(), "probe <target> [force/quiet]");
    }

    #[test]
    fn args_error_carries_fixed_title() {
        let result = CommandResult::args_error();
        assert!(result.error);
        assert!(result.args_error);
        assert_eq!(result.title.as_deref(), Some("Недостаточно аргументов!"));
    }

    #[test]
    fn api_permission_denial_maps_to_platform_variant() {
        let err: CommandError = ApiError::PermissionDenied.into();
        assert!(matches!(err, CommandError::PlatformPermission(_)));

        let err: CommandError = ApiError::transport("boom").into();
        assert!(matches!(err, CommandError::Other(_)));
    }
}
