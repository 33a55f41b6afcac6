//! # Cogwork
//!
//! A command-dispatch and module-loading core for chat bots.
//!
//! Cogwork turns raw platform messages into structured command invocations,
//! routes them through a registry of pluggable commands contributed by
//! independently loadable modules, gates each command behind a permission
//! policy, contains every failure, and answers with a uniform convention:
//! a reply embed plus exactly one status reaction.
//!
//! ## Pipeline
//!
//! ```text
//! raw message ─▶ ContextGenerator ─▶ CommandDispatcher::handle
//!                                        │ lookup (+ typo suggestions)
//!                                        │ permission gate
//!                                        ▼
//!                                   Command::execute ─▶ CommandResult
//!                                        │
//!                                        ▼
//!                              reply embed + status reaction
//! ```
//!
//! A parallel path fans every platform event out to each loaded module's
//! event hook, with per-module failure isolation:
//!
//! ```text
//! platform event ─▶ ModuleManager (EventSink) ─▶ Module::on_event × N
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use cogwork::prelude::*;
//!
//! let modules = Arc::new(ModuleManager::new("params.json"));
//! modules.load_params().await?;
//!
//! let dispatcher = Arc::new(CommandDispatcher::new(
//!     ContextGenerator::prefix("!"),
//!     vec![OriginId(1)],
//! ));
//!
//! modules.load_module(my_module.clone()).await;
//! dispatcher.register_command(my_command);
//! modules.enable_all().await;
//!
//! let bot = Bot::new("cogwork", modules, dispatcher);
//! // transport calls bot.on_message(...) / bot.dispatch_event(...)
//! ```
//!
//! The platform itself (transport, reconnects, the concrete message and
//! member objects) lives behind the traits in [`cogwork_core`].

pub use cogwork_core as core;

pub mod bot;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod lang;
pub mod manager;
pub mod module;
pub mod params;
pub mod permission;
pub mod testing;

pub use bot::Bot;
pub use command::{Command, CommandError, CommandOutcome, CommandResult, EmbedKind, SharedCommand};
pub use context::{CommandContext, ContextGenerator};
pub use dispatcher::CommandDispatcher;
pub use error::{ModuleError, ParamError, RegistryError};
pub use manager::{ModuleManager, TaskId};
pub use module::{Module, SharedModule};
pub use params::ParamStore;
pub use permission::PermissionPolicy;

/// Prelude for building bots on cogwork.
pub mod prelude {
    pub use std::sync::Arc;

    pub use crate::bot::Bot;
    pub use crate::command::{
        Command, CommandError, CommandOutcome, CommandResult, EmbedKind, SharedCommand,
    };
    pub use crate::context::{CommandContext, ContextGenerator};
    pub use crate::dispatcher::CommandDispatcher;
    pub use crate::lang::{formatted_duration, pluralize};
    pub use crate::manager::ModuleManager;
    pub use crate::module::{Module, SharedModule};
    pub use crate::permission::PermissionPolicy;

    pub use cogwork_core::{
        ApiError, ApiResult, BoxedEvent, Event, EventSink, MessageView, OriginId, Principal,
        ReplyEmbed, SharedMessage,
    };
}
