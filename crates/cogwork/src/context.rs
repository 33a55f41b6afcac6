//! Command-context derivation from raw message text.
//!
//! A [`ContextGenerator`] decides whether a message is a command invocation
//! at all, and if so tokenizes it into a [`CommandContext`]: command name,
//! positional arguments, extracted `--flags`, and the verbatim remainder
//! used by error replies.

use std::sync::Arc;

use cogwork_core::{ApiResult, ReplyEmbed, SharedMessage};

use crate::command::EmbedKind;

// ============================================================================
// ContextGenerator
// ============================================================================

/// Strategy for deriving a command invocation from a raw message.
///
/// The variant set is closed; today the only strategy is a literal
/// activation prefix, selected at construction time.
#[derive(Debug, Clone)]
pub enum ContextGenerator {
    /// A message is an invocation when its text starts with the prefix.
    Prefix { prefix: String },
}

impl ContextGenerator {
    /// Creates the prefix-based generator.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
        }
    }

    /// Derives a context from a message.
    ///
    /// Returns `None` when the message is not a command invocation; that
    /// is a normal outcome, not an error.
    pub fn process_message(&self, message: &SharedMessage) -> Option<CommandContext> {
        match self {
            Self::Prefix { prefix } => {
                let parsed = Invocation::parse(prefix, message.content())?;
                Some(CommandContext {
                    message: Arc::clone(message),
                    command: parsed.command,
                    args: parsed.args,
                    clean_args: parsed.clean_args,
                    keys: parsed.keys,
                    raw_content: parsed.raw_content,
                })
            }
        }
    }
}

/// Tokenized invocation, independent of any message object.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    command: String,
    args: Vec<String>,
    clean_args: Vec<String>,
    keys: Vec<String>,
    raw_content: String,
}

impl Invocation {
    /// Tokenizes `content` against `prefix`.
    ///
    /// Splits on whitespace; the first token (prefix stripped, lower-cased)
    /// is the command name. Tokens of the form `--name` (longer than the
    /// two dashes) become flag keys in order of first appearance; a
    /// duplicated flag token is recorded once and only one positional
    /// occurrence is removed. `clean_args` keeps every post-command token,
    /// flags included.
    fn parse(prefix: &str, content: &str) -> Option<Self> {
        let raw_content = content.strip_prefix(prefix)?.to_string();

        let mut tokens: Vec<String> = content.split_whitespace().map(str::to_owned).collect();
        if tokens.is_empty() {
            return None;
        }

        let clean_args = tokens[1..].to_vec();
        let first = tokens.remove(0);
        let command = first
            .strip_prefix(prefix)
            .unwrap_or(first.as_str())
            .to_lowercase();

        let mut flags: Vec<String> = Vec::new();
        for token in &tokens {
            if token.starts_with("--") && token.len() > 2 && !flags.contains(token) {
                flags.push(token.clone());
            }
        }
        for flag in &flags {
            if let Some(pos) = tokens.iter().position(|t| t == flag) {
                tokens.remove(pos);
            }
        }
        let keys = flags.into_iter().map(|f| f[2..].to_string()).collect();

        Some(Self {
            command,
            args: tokens,
            clean_args,
            keys,
            raw_content,
        })
    }
}

// ============================================================================
// CommandContext
// ============================================================================

/// One parsed command invocation, immutable once constructed.
///
/// Bundles the tokenized text with the originating message, and carries the
/// reply helpers commands use to talk back to the channel.
#[derive(Clone)]
pub struct CommandContext {
    message: SharedMessage,
    command: String,
    args: Vec<String>,
    clean_args: Vec<String>,
    keys: Vec<String>,
    raw_content: String,
}

impl CommandContext {
    /// The originating message.
    pub fn message(&self) -> &SharedMessage {
        &self.message
    }

    /// Lower-cased command name (first token, prefix stripped).
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Positional arguments, flags removed.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Every post-command token, flags included.
    pub fn clean_args(&self) -> &[String] {
        &self.clean_args
    }

    /// Flag names, `--` stripped, in order of first appearance.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether the invocation carried `--name`.
    pub fn has_key(&self, name: &str) -> bool {
        self.keys.iter().any(|k| k == name)
    }

    /// The message text after the prefix, verbatim, command token included.
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// Builds an embed with an explicit color and the standard
    /// requested-by footer.
    pub fn custom_embed(&self, message: &str, title: &str, color: u32) -> ReplyEmbed {
        let mut embed = ReplyEmbed::new(message, title, color);
        if let Some(author) = self.message.author() {
            embed = embed.with_footer(
                format!("Запросил: {}", author.tag()),
                author.avatar_url().map(str::to_owned),
            );
        }
        embed
    }

    /// Builds an embed for a result kind.
    ///
    /// `Info` embeds take the invoking principal's highest-role color; the
    /// other kinds use their fixed color. The kind also supplies the title
    /// when the caller passes none.
    pub fn embed(&self, kind: EmbedKind, message: &str, title: Option<&str>) -> ReplyEmbed {
        let color = kind.fixed_color().unwrap_or_else(|| {
            self.message
                .author()
                .map(|a| a.top_role_color())
                .unwrap_or_default()
        });
        self.custom_embed(message, title.unwrap_or_else(|| kind.default_title()), color)
    }

    /// Builds and sends a kind-flavored embed to the message's channel.
    pub async fn send_embed(
        &self,
        kind: EmbedKind,
        message: &str,
        title: Option<&str>,
    ) -> ApiResult<()> {
        self.message.send_embed(&self.embed(kind, message, title)).await
    }

    /// Sends plain text; with `reply` the author is mentioned first.
    pub async fn send(&self, text: &str, reply: bool) -> ApiResult<()> {
        if reply && let Some(author) = self.message.author() {
            let mentioned = format!("{}, {}", author.mention(), text);
            return self.message.send_text(&mentioned).await;
        }
        self.message.send_text(text).await
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("keys", &self.keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMessage, shared};
    use cogwork_core::SharedMessage;

    fn context_for(prefix: &str, content: &str) -> Option<CommandContext> {
        let message: SharedMessage = shared(FakeMessage::new(content));
        ContextGenerator::prefix(prefix).process_message(&message)
    }

    #[test]
    fn non_prefixed_message_yields_nothing() {
        assert!(context_for("!", "hello").is_none());
    }

    #[test]
    fn basic_invocation() {
        let ctx = context_for("!", "!cmd a b --x").unwrap();
        assert_eq!(ctx.command(), "cmd");
        assert_eq!(ctx.args(), ["a", "b"]);
        assert_eq!(ctx.keys(), ["x"]);
        assert!(ctx.has_key("x"));
        assert!(!ctx.has_key("y"));
    }

    #[test]
    fn command_name_is_lowercased_but_remainder_is_verbatim() {
        let ctx = context_for("!", "!KICK Someone").unwrap();
        assert_eq!(ctx.command(), "kick");
        assert_eq!(ctx.raw_content(), "KICK Someone");
    }

    #[test]
    fn clean_args_keep_flags() {
        let ctx = context_for("!", "!ban user --silent reason").unwrap();
        assert_eq!(ctx.args(), ["user", "reason"]);
        assert_eq!(ctx.clean_args(), ["user", "--silent", "reason"]);
        assert_eq!(ctx.keys(), ["silent"]);
    }

    #[test]
    fn bare_double_dash_is_positional() {
        let ctx = context_for("!", "!cmd -- --x").unwrap();
        assert_eq!(ctx.args(), ["--"]);
        assert_eq!(ctx.keys(), ["x"]);
    }

    #[test]
    fn duplicate_flag_recorded_once_and_one_occurrence_removed() {
        let ctx = context_for("!", "!cmd --x a --x").unwrap();
        assert_eq!(ctx.keys(), ["x"]);
        // The second literal token stays positional.
        assert_eq!(ctx.args(), ["a", "--x"]);
        assert_eq!(ctx.clean_args(), ["--x", "a", "--x"]);
    }

    #[test]
    fn flag_order_follows_first_appearance() {
        let ctx = context_for("!", "!cmd --b --a --b").unwrap();
        assert_eq!(ctx.keys(), ["b", "a"]);
    }

    #[test]
    fn longer_prefix_is_stripped_from_name_and_remainder() {
        let ctx = context_for("??", "??ping now").unwrap();
        assert_eq!(ctx.command(), "ping");
        assert_eq!(ctx.raw_content(), "ping now");
    }

    #[test]
    fn prefix_only_message_has_empty_command() {
        let ctx = context_for("!", "!").unwrap();
        assert_eq!(ctx.command(), "");
        assert!(ctx.args().is_empty());
    }
}
