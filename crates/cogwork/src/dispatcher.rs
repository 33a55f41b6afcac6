//! Command registry and dispatch pipeline.
//!
//! [`CommandDispatcher`] owns the name → command mapping and runs the whole
//! per-invocation state machine: context derivation, origin gating, registry
//! lookup with typo suggestions, permission gating, execution with failure
//! containment, and rendering of the outcome as a reply embed plus exactly
//! one status reaction.
//!
//! Every failure mode terminates in a [`CommandResult`]; nothing from the
//! execution path escapes [`handle`](CommandDispatcher::handle) except
//! platform errors from the final send/react calls themselves.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::seq::IndexedRandom;
use tracing::{debug, error, info, warn};

use cogwork_core::{ApiError, ApiResult, OriginId, SharedMessage};

use crate::command::{Command, CommandError, CommandResult, SharedCommand};
use crate::context::{CommandContext, ContextGenerator};
use crate::error::RegistryError;

/// Status-reaction emoji, one per result category.
mod emoji {
    pub const OK: &str = "☑";
    pub const ERROR: &str = "❌";
    pub const ACCESS_DENIED: &str = "🚫";
    pub const ARGS_ERROR: &str = "⁉";
}

/// Refusal phrases substituted into access-denied replies, picked at random.
const ACCESS_DENIED_PHRASES: &[&str] = &[
    "Нет прав!",
    "Прав не завезли.",
    "Вы точно уверены? (да/нет)",
    "Что-то пошло не так. Попробуйте позже",
    "Увы, но ты слишком мелковат для этого действия.",
    "Действие НЕ выполнено. Не знаю, почему.",
    "[ACCESS DENIED!](https://www.youtube.com/watch?v=2dZy3cd9KFY)",
];

/// Names scoring above this similarity to a mistyped command are suggested.
const SIMILARITY_THRESHOLD: f64 = 0.5;

// ============================================================================
// CommandDispatcher
// ============================================================================

/// Central command registry and dispatcher.
pub struct CommandDispatcher {
    commands: RwLock<HashMap<String, SharedCommand>>,
    generator: ContextGenerator,
    whitelist: Vec<OriginId>,
}

impl CommandDispatcher {
    /// Creates a dispatcher with the given context generator and origin
    /// allow-list.
    pub fn new(generator: ContextGenerator, whitelist: Vec<OriginId>) -> Self {
        Self {
            commands: RwLock::new(HashMap::new()),
            generator,
            whitelist,
        }
    }

    // ─── Registry ────────────────────────────────────────────────────────

    /// Registers a command under its name. Re-registering a name replaces
    /// the previous entry.
    pub fn register_command(&self, command: SharedCommand) {
        let name = command.name().to_string();
        let replaced = self.commands.write().insert(name.clone(), command);
        if replaced.is_some() {
            warn!(command = %name, "Command re-registered, previous entry replaced");
        } else {
            info!(command = %name, "Command registered");
        }
    }

    /// Removes a command by exact name. A missing name is an error.
    pub fn unregister_command(&self, name: &str) -> Result<(), RegistryError> {
        let removed = self
            .commands
            .write()
            .remove(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_string()))?;
        info!(
            command = %name,
            module = %removed.module_name(),
            "Command unregistered"
        );
        Ok(())
    }

    /// Removes every command owned by the named module, one by one.
    pub fn unregister_module_commands(&self, module_name: &str) {
        let names: Vec<String> = {
            let commands = self.commands.read();
            commands
                .values()
                .filter(|c| c.module_name() == module_name)
                .map(|c| c.name().to_string())
                .collect()
        };

        for name in names {
            if let Err(e) = self.unregister_command(&name) {
                warn!(command = %name, error = %e, "Bulk unregistration skipped a command");
            }
        }
    }

    /// Number of registered commands.
    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    fn lookup(&self, name: &str) -> Option<SharedCommand> {
        self.commands.read().get(name).cloned()
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Handles one incoming message end to end.
    ///
    /// Silently ignores messages that are not command invocations, come
    /// from non-member or self authors, or are shorter than two characters.
    /// Everything else terminates in a rendered [`CommandResult`]: a reply
    /// embed (when it has any text) plus exactly one status reaction.
    pub async fn handle(&self, message: SharedMessage) -> ApiResult<()> {
        let Some(ctx) = self.generator.process_message(&message) else {
            return Ok(());
        };

        if message.author().is_none()
            || message.content().chars().count() < 2
            || message.author_is_self()
        {
            return Ok(());
        }

        let mut reaction_override: Option<&'static str> = None;
        let mut resolved: Option<SharedCommand> = None;

        let result = if !self.whitelist.contains(&message.origin()) {
            debug!(origin = %message.origin(), "Origin not in the allow-list");
            CommandResult::error()
                .with_message("Этот сервер не состоит в белом списке разрешенных серверов бота.")
        } else if let Some(command) = self.lookup(ctx.command()) {
            resolved = Some(Arc::clone(&command));

            let permitted = message
                .author()
                .map(|author| command.permission().allows(author))
                .unwrap_or(false);

            if !permitted {
                reaction_override = Some(emoji::ACCESS_DENIED);
                denied_result()
            } else if command.should_await() {
                let mut result = match command.execute(&ctx).await {
                    Ok(result) => result,
                    Err(CommandError::PlatformPermission(_)) => CommandResult::error()
                        .with_message("У бота нет прав, чтобы совершить это действие!"),
                    Err(CommandError::Other(e)) => {
                        error!(command = %command.name(), error = %format!("{e:?}"), "Command failed");
                        CommandResult::error()
                            .with_message(format!(
                                "Техническая информация/Stacktrace: \n```{e:?}```"
                            ))
                            .with_title("⚠ Не удалось выполнить команду ⚠")
                    }
                };

                // A command may decide access denial on its own after
                // passing the registry-level permission gate; that outcome
                // gets the same substituted reply as the early check.
                if result.access_denied {
                    reaction_override = Some(emoji::ACCESS_DENIED);
                    result = denied_result();
                }
                result
            } else {
                let detached = Arc::clone(&command);
                let detached_ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(e) = detached.execute(&detached_ctx).await {
                        error!(
                            command = %detached.name(),
                            error = %format!("{e:?}"),
                            "Detached command failed"
                        );
                    }
                });
                CommandResult::ok()
            }
        } else {
            self.not_found_result(&ctx)
        };

        self.render(&ctx, resolved.as_deref(), &result, reaction_override)
            .await
    }

    /// Builds the command-not-found reply, suggesting similarly named
    /// commands when any score above the threshold.
    fn not_found_result(&self, ctx: &CommandContext) -> CommandResult {
        let mut similar: Vec<String> = Vec::new();
        {
            let commands = self.commands.read();
            for command in commands.values() {
                let ratio = sequence_similarity(ctx.command(), command.name());
                if ratio > SIMILARITY_THRESHOLD {
                    similar.push(format!("{} ({:.2})", command.name(), ratio));
                }
            }
        }

        let suggestions = if similar.is_empty() {
            String::new()
        } else {
            format!("Возможно, вы имели в виду: {}", similar.join(", "))
        };

        CommandResult::error()
            .with_message(format!("Ты {}\n{}", ctx.raw_content(), suggestions))
            .with_title("Команда не найдена!")
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    async fn render(
        &self,
        ctx: &CommandContext,
        command: Option<&dyn Command>,
        result: &CommandResult,
        reaction_override: Option<&'static str>,
    ) -> ApiResult<()> {
        let body = result.message.as_deref().unwrap_or_default();
        let title = result.title.as_deref();

        let mut embed = match result.color {
            Some(color) => {
                ctx.custom_embed(body, title.unwrap_or_else(|| result.kind.default_title()), color)
            }
            None => ctx.embed(result.kind, body, title),
        };

        let mut reaction = reaction_override;
        if result.args_error
            && let Some(command) = command
        {
            reaction = Some(emoji::ARGS_ERROR);
            embed = embed.with_field(command.detailed_name(), command.description());
        }

        if result.message.is_some() || result.title.is_some() {
            ctx.message().send_embed(&embed).await?;
        }

        let status = reaction.unwrap_or(if result.error { emoji::ERROR } else { emoji::OK });
        match ctx.message().add_reaction(status).await {
            // The message vanished before we could react to it.
            Err(ApiError::NotFound) => Ok(()),
            other => other,
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("command_count", &self.commands.read().len())
            .field("whitelist", &self.whitelist)
            .finish()
    }
}

/// A fresh access-denied result with a randomly picked refusal phrase.
fn denied_result() -> CommandResult {
    let phrase = ACCESS_DENIED_PHRASES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(ACCESS_DENIED_PHRASES[0]);
    CommandResult::error()
        .with_message(phrase)
        .with_title("Нет прав!")
}

// ============================================================================
// Similarity
// ============================================================================

/// Normalized edit-distance similarity between two strings, in `0.0..=1.0`.
///
/// `1.0` means equal; `0.0` means nothing in common. Computed over
/// characters as `1 - levenshtein(a, b) / max(|a|, |b|)`.
fn sequence_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, &ca) in a.iter().enumerate() {
        let mut previous_diagonal = row[0];
        row[0] = i + 1;

        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous_diagonal + usize::from(ca != cb);
            previous_diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(previous_diagonal + 1);
        }
    }

    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutcome;
    use crate::permission::PermissionPolicy;
    use crate::testing::{FakeMessage, FakePrincipal, shared};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ─── Similarity ──────────────────────────────────────────────────────

    #[test]
    fn similarity_bounds() {
        assert_eq!(sequence_similarity("help", "help"), 1.0);
        assert_eq!(sequence_similarity("abc", "xyz"), 0.0);
        assert_eq!(sequence_similarity("", ""), 1.0);
    }

    #[test]
    fn similarity_close_names_score_high() {
        assert!(sequence_similarity("hlp", "help") > 0.5);
        assert!(sequence_similarity("pong", "ping") > 0.5);
        assert!(sequence_similarity("x", "help") <= 0.5);
    }

    #[test]
    fn levenshtein_basics() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("abc"), &chars("")), 3);
    }

    // ─── Test command ────────────────────────────────────────────────────

    enum StubBehavior {
        Reply(CommandResult),
        PlatformDenied,
        Explode(&'static str),
    }

    struct StubCommand {
        name: &'static str,
        module: &'static str,
        args: &'static str,
        keys: Vec<String>,
        permission: PermissionPolicy,
        awaited: bool,
        behavior: StubBehavior,
        executions: Arc<AtomicUsize>,
    }

    impl StubCommand {
        fn replying(name: &'static str, result: CommandResult) -> Self {
            Self {
                name,
                module: "test",
                args: "",
                keys: Vec::new(),
                permission: PermissionPolicy::AcceptAll,
                awaited: true,
                behavior: StubBehavior::Reply(result),
                executions: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Command for StubCommand {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "a stub"
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
            self.module
        }

        fn should_await(&self) -> bool {
            self.awaited
        }

        async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome {
            self.executions.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                StubBehavior::Reply(result) => Ok(result.clone()),
                StubBehavior::PlatformDenied => Err(ApiError::PermissionDenied.into()),
                StubBehavior::Explode(reason) => Err(anyhow::anyhow!(*reason).into()),
            }
        }
    }

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(ContextGenerator::prefix("!"), vec![OriginId(1)])
    }

    // ─── Registry ────────────────────────────────────────────────────────

    #[test]
    fn re_registration_overwrites() {
        let dispatcher = dispatcher();
        let first = StubCommand::replying("ping", CommandResult::ok());
        let mut second = StubCommand::replying("ping", CommandResult::ok());
        second.module = "other";

        dispatcher.register_command(Arc::new(first));
        dispatcher.register_command(Arc::new(second));

        assert_eq!(dispatcher.command_count(), 1);
        assert_eq!(dispatcher.lookup("ping").unwrap().module_name(), "other");
    }

    #[test]
    fn unregistering_missing_name_fails() {
        let dispatcher = dispatcher();
        let result = dispatcher.unregister_command("ghost");
        assert!(matches!(result, Err(RegistryError::UnknownCommand(_))));
    }

    #[test]
    fn bulk_unregistration_filters_by_module() {
        let dispatcher = dispatcher();
        let mut foreign = StubCommand::replying("keepme", CommandResult::ok());
        foreign.module = "other";

        dispatcher.register_command(Arc::new(StubCommand::replying("a", CommandResult::ok())));
        dispatcher.register_command(Arc::new(StubCommand::replying("b", CommandResult::ok())));
        dispatcher.register_command(Arc::new(foreign));

        dispatcher.unregister_module_commands("test");

        assert_eq!(dispatcher.command_count(), 1);
        assert!(dispatcher.lookup("keepme").is_some());
    }

    // ─── Silent aborts ───────────────────────────────────────────────────

    #[tokio::test]
    async fn non_command_messages_are_ignored() {
        let dispatcher = dispatcher();
        let msg = shared(FakeMessage::new("hello"));
        dispatcher.handle(msg.clone()).await.unwrap();
        assert!(msg.outgoing().is_empty());
    }

    #[tokio::test]
    async fn short_self_and_authorless_messages_are_ignored() {
        let dispatcher = dispatcher();

        let short = shared(FakeMessage::new("!"));
        dispatcher.handle(short.clone()).await.unwrap();
        assert!(short.outgoing().is_empty());

        let own = shared(FakeMessage::new("!ping").from_self());
        dispatcher.handle(own.clone()).await.unwrap();
        assert!(own.outgoing().is_empty());

        let webhook = shared(FakeMessage::new("!ping").without_author());
        dispatcher.handle(webhook.clone()).await.unwrap();
        assert!(webhook.outgoing().is_empty());
    }

    // ─── Origin gating ───────────────────────────────────────────────────

    #[tokio::test]
    async fn foreign_origin_is_rejected_without_lookup() {
        let dispatcher = dispatcher();
        let probe = StubCommand::replying("ping", CommandResult::ok());
        let executions = Arc::clone(&probe.executions);
        dispatcher.register_command(Arc::new(probe));

        let msg = shared(FakeMessage::new("!ping").in_origin(OriginId(99)));
        dispatcher.handle(msg.clone()).await.unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 0);
        let embeds = msg.embeds();
        assert_eq!(embeds.len(), 1);
        assert!(embeds[0].description.contains("белом списке"));
        assert_eq!(msg.reactions(), vec![emoji::ERROR]);
    }

    // ─── Lookup and suggestions ──────────────────────────────────────────

    #[tokio::test]
    async fn unknown_command_suggests_similar_names() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "help",
            CommandResult::ok(),
        )));

        let msg = shared(FakeMessage::new("!hlp me out"));
        dispatcher.handle(msg.clone()).await.unwrap();

        let embeds = msg.embeds();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].title, "**Команда не найдена!**");
        assert!(embeds[0].description.contains("Ты hlp me out"));
        assert!(embeds[0].description.contains("Возможно, вы имели в виду: help ("));
        assert_eq!(msg.reactions(), vec![emoji::ERROR]);
    }

    #[tokio::test]
    async fn dissimilar_names_are_not_suggested() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "ban",
            CommandResult::ok(),
        )));

        let msg = shared(FakeMessage::new("!xyzzy"));
        dispatcher.handle(msg.clone()).await.unwrap();

        let embeds = msg.embeds();
        assert!(!embeds[0].description.contains("Возможно"));
    }

    // ─── Permission gating ───────────────────────────────────────────────

    #[tokio::test]
    async fn missing_capability_short_circuits_execution() {
        let dispatcher = dispatcher();
        let mut guarded = StubCommand::replying("wipe", CommandResult::ok());
        guarded.permission = PermissionPolicy::require(["manage"]);
        let executions = Arc::clone(&guarded.executions);
        dispatcher.register_command(Arc::new(guarded));

        let msg = shared(FakeMessage::new("!wipe"));
        dispatcher.handle(msg.clone()).await.unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 0);
        let embeds = msg.embeds();
        assert_eq!(embeds[0].title, "**Нет прав!**");
        assert!(ACCESS_DENIED_PHRASES.contains(&embeds[0].description.as_str()));
        assert_eq!(msg.reactions(), vec![emoji::ACCESS_DENIED]);
    }

    #[tokio::test]
    async fn matching_capability_reaches_execution() {
        let dispatcher = dispatcher();
        let mut guarded = StubCommand::replying("wipe", CommandResult::ok());
        guarded.permission = PermissionPolicy::require(["manage"]);
        let executions = Arc::clone(&guarded.executions);
        dispatcher.register_command(Arc::new(guarded));

        let author = FakePrincipal::named("admin").with_capabilities(["manage"]);
        let msg = shared(FakeMessage::new("!wipe").from_author(author));
        dispatcher.handle(msg.clone()).await.unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(msg.reactions(), vec![emoji::OK]);
    }

    // ─── Execution containment ───────────────────────────────────────────

    #[tokio::test]
    async fn platform_denial_becomes_fixed_reply() {
        let dispatcher = dispatcher();
        let mut failing = StubCommand::replying("purge", CommandResult::ok());
        failing.behavior = StubBehavior::PlatformDenied;
        dispatcher.register_command(Arc::new(failing));

        let msg = shared(FakeMessage::new("!purge"));
        dispatcher.handle(msg.clone()).await.unwrap();

        let embeds = msg.embeds();
        assert!(embeds[0]
            .description
            .contains("У бота нет прав, чтобы совершить это действие!"));
        assert_eq!(msg.reactions(), vec![emoji::ERROR]);
    }

    #[tokio::test]
    async fn unhandled_failure_carries_diagnostics() {
        let dispatcher = dispatcher();
        let mut failing = StubCommand::replying("crashy", CommandResult::ok());
        failing.behavior = StubBehavior::Explode("index out of range");
        dispatcher.register_command(Arc::new(failing));

        let msg = shared(FakeMessage::new("!crashy"));
        dispatcher.handle(msg.clone()).await.unwrap();

        let embeds = msg.embeds();
        assert_eq!(embeds[0].title, "**⚠ Не удалось выполнить команду ⚠**");
        assert!(embeds[0].description.contains("Техническая информация/Stacktrace"));
        assert!(embeds[0].description.contains("index out of range"));
        assert_eq!(msg.reactions(), vec![emoji::ERROR]);
    }

    #[tokio::test]
    async fn command_returned_denial_is_rewritten() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "vault",
            CommandResult::access_denied(),
        )));

        let msg = shared(FakeMessage::new("!vault"));
        dispatcher.handle(msg.clone()).await.unwrap();

        let embeds = msg.embeds();
        assert_eq!(embeds[0].title, "**Нет прав!**");
        assert!(ACCESS_DENIED_PHRASES.contains(&embeds[0].description.as_str()));
        assert_eq!(msg.reactions(), vec![emoji::ACCESS_DENIED]);
    }

    // ─── Detach mode ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn detached_commands_answer_immediately() {
        let dispatcher = dispatcher();
        let mut detached = StubCommand::replying("bg", CommandResult::ok());
        detached.awaited = false;
        let executions = Arc::clone(&detached.executions);
        dispatcher.register_command(Arc::new(detached));

        let msg = shared(FakeMessage::new("!bg"));
        dispatcher.handle(msg.clone()).await.unwrap();

        // Immediate synthesized success, reaction only.
        assert!(msg.embeds().is_empty());
        assert_eq!(msg.reactions(), vec![emoji::OK]);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    // ─── Argument errors and usage ───────────────────────────────────────

    #[tokio::test]
    async fn args_error_appends_usage_field() {
        let dispatcher = dispatcher();
        let mut needy = StubCommand::replying(
            "kick",
            CommandResult::args_error().with_message("Кого кикать?"),
        );
        needy.args = "<user>";
        needy.keys = vec!["silent".into()];
        dispatcher.register_command(Arc::new(needy));

        let msg = shared(FakeMessage::new("!kick"));
        dispatcher.handle(msg.clone()).await.unwrap();

        let embeds = msg.embeds();
        assert_eq!(embeds[0].title, "**Недостаточно аргументов!**");
        assert_eq!(embeds[0].fields.len(), 1);
        assert_eq!(embeds[0].fields[0].name, "kick <user> [silent]");
        assert_eq!(embeds[0].fields[0].value, "a stub");
        assert_eq!(msg.reactions(), vec![emoji::ARGS_ERROR]);
    }

    // ─── Reactions and colors ────────────────────────────────────────────

    #[tokio::test]
    async fn vanished_message_reaction_is_swallowed() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "ping",
            CommandResult::ok(),
        )));

        let msg = shared(FakeMessage::new("!ping").failing_reactions_with(ApiError::NotFound));
        assert!(dispatcher.handle(msg).await.is_ok());
    }

    #[tokio::test]
    async fn other_reaction_failures_propagate() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "ping",
            CommandResult::ok(),
        )));

        let msg = shared(
            FakeMessage::new("!ping").failing_reactions_with(ApiError::transport("disconnected")),
        );
        assert!(matches!(
            dispatcher.handle(msg).await,
            Err(ApiError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn info_replies_take_the_authors_role_color() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "about",
            CommandResult::info().with_message("версия 1.0"),
        )));

        let author = FakePrincipal::named("tester").with_role_color(0x00AA55);
        let msg = shared(FakeMessage::new("!about").from_author(author));
        dispatcher.handle(msg.clone()).await.unwrap();

        assert_eq!(msg.embeds()[0].color, 0x00AA55);
    }

    #[tokio::test]
    async fn explicit_color_override_wins() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "paint",
            CommandResult::ok().with_message("done").with_color(0x123456),
        )));

        let msg = shared(FakeMessage::new("!paint"));
        dispatcher.handle(msg.clone()).await.unwrap();

        assert_eq!(msg.embeds()[0].color, 0x123456);
        assert_eq!(msg.embeds()[0].title, "**ОК**");
    }

    #[tokio::test]
    async fn textless_success_sends_no_embed() {
        let dispatcher = dispatcher();
        dispatcher.register_command(Arc::new(StubCommand::replying(
            "quiet",
            CommandResult::ok(),
        )));

        let msg = shared(FakeMessage::new("!quiet"));
        dispatcher.handle(msg.clone()).await.unwrap();

        assert!(msg.embeds().is_empty());
        assert_eq!(msg.reactions(), vec![emoji::OK]);
    }

    #[tokio::test]
    async fn command_matching_is_case_insensitive_on_input() {
        let dispatcher = dispatcher();
        let probe = StubCommand::replying("ping", CommandResult::ok());
        let executions = Arc::clone(&probe.executions);
        dispatcher.register_command(Arc::new(probe));

        let msg = shared(FakeMessage::new("!PiNg"));
        dispatcher.handle(msg.clone()).await.unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }
}
