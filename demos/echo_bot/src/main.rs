//! Echo Bot demo
//!
//! Drives the whole cogwork pipeline against the in-memory platform from
//! `cogwork::testing`, with no real chat transport required. The script
//! walks through every dispatch outcome once:
//!
//! - a plain command (`!ping`)
//! - an informational reply taking the author's role color (`!echo`)
//! - a mistyped command with typo suggestions (`!pin`)
//! - a permission-gated command against an unprivileged author (`!wipe`)
//! - an argument error with an appended usage field (`!kick`)
//! - a detach-mode command answering before it finishes (`!remind`)
//!
//! and finishes with event fan-out, a persisted parameter, and a module
//! unload that cancels an owned background task.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use cogwork::prelude::*;
use cogwork::testing::{FakeEvent, FakeMessage, FakePrincipal, Outgoing, shared};

// ============================================================================
// Module
// ============================================================================

/// The demo's single module; owns every command below.
struct GeneralModule;

const MODULE_NAME: &str = "general";

#[async_trait]
impl Module for GeneralModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn description(&self) -> &str {
        "базовые команды"
    }

    async fn on_enable(&self) -> Result<()> {
        info!("general module ready");
        Ok(())
    }

    async fn on_event(&self, event: &BoxedEvent) -> Result<()> {
        if let Some(fake) = event.downcast_ref::<FakeEvent>() {
            info!(event = event.event_name(), payload = %fake.payload, "module saw event");
        }
        Ok(())
    }
}

// ============================================================================
// Commands
// ============================================================================

struct PingCommand {
    policy: PermissionPolicy,
}

#[async_trait]
impl Command for PingCommand {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Проверка, что бот жив"
    }

    fn permission(&self) -> &PermissionPolicy {
        &self.policy
    }

    fn module_name(&self) -> &str {
        MODULE_NAME
    }

    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome {
        Ok(CommandResult::ok().with_message("Понг!"))
    }
}

struct EchoCommand {
    policy: PermissionPolicy,
}

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Повторяет сказанное"
    }

    fn args_usage(&self) -> &str {
        "<текст>"
    }

    fn permission(&self) -> &PermissionPolicy {
        &self.policy
    }

    fn module_name(&self) -> &str {
        MODULE_NAME
    }

    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome {
        if ctx.args().is_empty() {
            return Ok(CommandResult::args_error().with_message("Мне нечего повторять."));
        }
        Ok(CommandResult::info().with_message(ctx.args().join(" ")))
    }
}

struct UptimeCommand {
    policy: PermissionPolicy,
    started_at: Instant,
}

#[async_trait]
impl Command for UptimeCommand {
    fn name(&self) -> &str {
        "uptime"
    }

    fn description(&self) -> &str {
        "Сколько бот уже работает"
    }

    fn permission(&self) -> &PermissionPolicy {
        &self.policy
    }

    fn module_name(&self) -> &str {
        MODULE_NAME
    }

    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome {
        let uptime = cogwork::lang::formatted_duration(self.started_at.elapsed().as_secs());
        let text = if uptime.is_empty() {
            "Я только что запустился.".to_string()
        } else {
            format!("Я работаю уже {uptime}.")
        };
        Ok(CommandResult::info().with_message(text))
    }
}

struct WipeCommand {
    policy: PermissionPolicy,
}

#[async_trait]
impl Command for WipeCommand {
    fn name(&self) -> &str {
        "wipe"
    }

    fn description(&self) -> &str {
        "Очищает хранилище (только для управляющих)"
    }

    fn permission(&self) -> &PermissionPolicy {
        &self.policy
    }

    fn module_name(&self) -> &str {
        MODULE_NAME
    }

    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome {
        Ok(CommandResult::ok().with_message("Хранилище очищено."))
    }
}

struct KickCommand {
    policy: PermissionPolicy,
    keys: Vec<String>,
}

#[async_trait]
impl Command for KickCommand {
    fn name(&self) -> &str {
        "kick"
    }

    fn description(&self) -> &str {
        "Выгоняет участника"
    }

    fn args_usage(&self) -> &str {
        "<участник>"
    }

    fn keys_usage(&self) -> &[String] {
        &self.keys
    }

    fn permission(&self) -> &PermissionPolicy {
        &self.policy
    }

    fn module_name(&self) -> &str {
        MODULE_NAME
    }

    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome {
        let Some(target) = ctx.args().first() else {
            return Ok(CommandResult::args_error().with_message("Кого выгонять?"));
        };
        let quietly = ctx.has_key("silent");
        Ok(CommandResult::ok().with_message(format!(
            "{target} выгнан{}.",
            if quietly { " (тихо)" } else { "" }
        )))
    }
}

/// Detach-mode command: the dispatcher answers immediately, the reminder
/// text arrives later.
struct RemindCommand {
    policy: PermissionPolicy,
}

#[async_trait]
impl Command for RemindCommand {
    fn name(&self) -> &str {
        "remind"
    }

    fn description(&self) -> &str {
        "Напоминает о чём-нибудь чуть позже"
    }

    fn args_usage(&self) -> &str {
        "<текст>"
    }

    fn permission(&self) -> &PermissionPolicy {
        &self.policy
    }

    fn module_name(&self) -> &str {
        MODULE_NAME
    }

    fn should_await(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let text = format!("напоминаю: {}", ctx.args().join(" "));
        ctx.send(&text, true).await?;
        Ok(CommandResult::ok())
    }
}

// ============================================================================
// Script
// ============================================================================

/// Feeds one message through the bot and prints what the platform saw.
async fn converse(bot: &Bot, message: FakeMessage) -> Result<()> {
    let content = message.content().to_string();
    let message = shared(message);
    bot.on_message(message.clone()).await?;

    for outgoing in message.outgoing() {
        match outgoing {
            Outgoing::Embed(embed) => {
                info!(">> {content}  ->  {} {}", embed.title, embed.description)
            }
            Outgoing::Text(text) => info!(">> {content}  ->  {text}"),
            Outgoing::Reaction(emoji) => info!(">> {content}  ->  reaction {emoji}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Assemble the core ────────────────────────────────────────────────
    let modules = Arc::new(ModuleManager::new("params.json"));
    modules.load_params().await?;

    let dispatcher = Arc::new(CommandDispatcher::new(
        ContextGenerator::prefix("!"),
        vec![OriginId(1)],
    ));

    let general: SharedModule = Arc::new(GeneralModule);
    modules.load_module(Arc::clone(&general)).await;

    let everyone = PermissionPolicy::AcceptAll;
    dispatcher.register_command(Arc::new(PingCommand {
        policy: everyone.clone(),
    }));
    dispatcher.register_command(Arc::new(EchoCommand {
        policy: everyone.clone(),
    }));
    dispatcher.register_command(Arc::new(UptimeCommand {
        policy: everyone.clone(),
        started_at: Instant::now(),
    }));
    dispatcher.register_command(Arc::new(WipeCommand {
        policy: PermissionPolicy::require(["manage"]),
    }));
    dispatcher.register_command(Arc::new(KickCommand {
        policy: everyone.clone(),
        keys: vec!["silent".into()],
    }));
    dispatcher.register_command(Arc::new(RemindCommand { policy: everyone }));

    modules.enable_all().await;

    let bot = Bot::new("echo-bot", Arc::clone(&modules), dispatcher);

    // ── A scripted conversation ──────────────────────────────────────────
    let member = FakePrincipal::named("гость").with_role_color(0x00AA55);

    converse(&bot, FakeMessage::new("!ping")).await?;
    converse(
        &bot,
        FakeMessage::new("!echo привет мир").from_author(member.clone()),
    )
    .await?;
    converse(&bot, FakeMessage::new("!uptime")).await?;
    converse(&bot, FakeMessage::new("!pin")).await?; // typo -> suggestion
    converse(&bot, FakeMessage::new("!wipe")).await?; // no "manage" -> denied
    converse(&bot, FakeMessage::new("!kick")).await?; // usage field appended
    converse(&bot, FakeMessage::new("!kick бездельник --silent")).await?;

    // Detach mode: the ☑ lands immediately, the reminder text later.
    let reminder = shared(FakeMessage::new("!remind выпить чаю"));
    bot.on_message(reminder.clone()).await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    for outgoing in reminder.outgoing() {
        info!(?outgoing, "reminder message activity");
    }

    // ── Event fan-out ────────────────────────────────────────────────────
    bot.dispatch_event(BoxedEvent::new(FakeEvent::new("on_member_join", "новичок")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // ── Parameters persist across saves ──────────────────────────────────
    modules.add_param("greeting", "Добро пожаловать!").await?;
    let greeting: String = modules.get_param("greeting")?;
    info!(%greeting, "stored parameter");

    // ── Unload: owned background tasks die with the module ───────────────
    modules
        .add_background_task(
            Box::pin(async {
                loop {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
            }),
            &general,
        )
        .await?;
    bot.commands().unregister_module_commands(MODULE_NAME);
    modules.unload_module(&general).await?;
    info!("module unloaded, owned task cancelled, bye");

    Ok(())
}
