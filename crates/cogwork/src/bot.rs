//! Top-level bot glue.
//!
//! [`Bot`] bundles the two halves of the core (the module manager and the
//! command dispatcher) behind the two entry points a transport needs:
//! [`on_message`](Bot::on_message) for incoming messages and
//! [`dispatch_event`](Bot::dispatch_event) for everything else. Connection
//! management stays with the transport; the bot only reacts.

use std::sync::Arc;
use std::time::Instant;

use cogwork_core::{ApiResult, BoxedEvent, SharedMessage};

use crate::dispatcher::CommandDispatcher;
use crate::lang::formatted_duration;
use crate::manager::ModuleManager;

/// The assembled bot core.
pub struct Bot {
    name: String,
    modules: Arc<ModuleManager>,
    commands: Arc<CommandDispatcher>,
    started_at: Instant,
}

impl Bot {
    /// Assembles a bot from its two halves. Uptime counts from this call.
    pub fn new(
        name: impl Into<String>,
        modules: Arc<ModuleManager>,
        commands: Arc<CommandDispatcher>,
    ) -> Self {
        Self {
            name: name.into(),
            modules,
            commands,
            started_at: Instant::now(),
        }
    }

    /// The bot's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module manager.
    pub fn modules(&self) -> &Arc<ModuleManager> {
        &self.modules
    }

    /// The command dispatcher.
    pub fn commands(&self) -> &Arc<CommandDispatcher> {
        &self.commands
    }

    /// Seconds since the bot was assembled.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Uptime as human-readable Russian text, empty under one second.
    pub fn uptime_text(&self) -> String {
        formatted_duration(self.uptime_seconds())
    }

    /// Entry point for every incoming message.
    pub async fn on_message(&self, message: SharedMessage) -> ApiResult<()> {
        self.commands.handle(message).await
    }

    /// Entry point for every platform event; fans out to all loaded
    /// modules without waiting for them.
    pub fn dispatch_event(&self, event: BoxedEvent) {
        self.modules.dispatch_event(event);
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("name", &self.name)
            .field("uptime_seconds", &self.uptime_seconds())
            .finish()
    }
}
