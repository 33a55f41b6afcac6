//! Platform message and principal views.
//!
//! These traits are the seam between the dispatch core and the chat
//! platform. The core only ever sees the handful of fields enumerated here;
//! everything else about the platform's message, member and guild objects
//! stays opaque on the other side of the trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embed::ReplyEmbed;
use crate::error::ApiResult;

/// Identity of the origin (enclosing server/guild) a message was sent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginId(pub u64);

impl std::fmt::Display for OriginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The identity on whose behalf a command is invoked.
///
/// Implemented by the platform layer over its member object. Only
/// member-type authors qualify; webhook or system authors are represented
/// by [`MessageView::author`] returning `None`.
pub trait Principal: Send + Sync {
    /// Display name inside the origin.
    fn display_name(&self) -> &str;

    /// Fully qualified name, `name#discriminator` style. Used in footers.
    fn tag(&self) -> String;

    /// Avatar image URL, if the platform exposes one.
    fn avatar_url(&self) -> Option<&str>;

    /// Color of the principal's highest role, as 24-bit RGB.
    fn top_role_color(&self) -> u32;

    /// Inline mention string for this principal.
    fn mention(&self) -> String;

    /// Whether the platform has granted the named permission to this
    /// principal in the message's origin.
    fn has_capability(&self, name: &str) -> bool;
}

/// The core's view of one incoming platform message.
///
/// Covers both directions: reading the fields dispatch needs, and the two
/// reply primitives (send an embed to the message's channel, react to the
/// message itself).
#[async_trait]
pub trait MessageView: Send + Sync {
    /// Raw text of the message.
    fn content(&self) -> &str;

    /// Origin the message was sent in.
    fn origin(&self) -> OriginId;

    /// The author as a principal, or `None` when the author is not a
    /// member-type principal (webhooks, system messages).
    fn author(&self) -> Option<&dyn Principal>;

    /// Whether the message was authored by the bot itself.
    fn author_is_self(&self) -> bool;

    /// Sends an embed to the channel this message came from.
    async fn send_embed(&self, embed: &ReplyEmbed) -> ApiResult<()>;

    /// Sends plain text to the channel this message came from.
    async fn send_text(&self, text: &str) -> ApiResult<()>;

    /// Adds a single emoji reaction to this message.
    async fn add_reaction(&self, emoji: &str) -> ApiResult<()>;
}

/// Shared handle to a message view, as passed through the dispatch pipeline.
pub type SharedMessage = Arc<dyn MessageView>;
