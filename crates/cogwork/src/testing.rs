//! In-memory platform doubles.
//!
//! A tiny fake chat platform: principals with scripted capabilities and
//! messages that record everything the core asks the platform to do. The
//! framework's own tests run on these, and `demos/echo_bot` wires a whole
//! conversation through them with no real transport required.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use cogwork_core::{
    ApiError, ApiResult, Event, MessageView, OriginId, Principal, ReplyEmbed,
};

// ============================================================================
// FakePrincipal
// ============================================================================

/// A principal with a fixed name and a scripted capability set.
#[derive(Debug, Clone)]
pub struct FakePrincipal {
    name: String,
    discriminator: u16,
    avatar_url: Option<String>,
    role_color: u32,
    capabilities: Vec<String>,
}

impl FakePrincipal {
    /// Creates a principal with the given display name and no capabilities.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminator: 1,
            avatar_url: None,
            role_color: 0x95A5A6,
            capabilities: Vec::new(),
        }
    }

    /// Grants the named platform permissions.
    pub fn with_capabilities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the color reported as the principal's highest role.
    pub fn with_role_color(mut self, color: u32) -> Self {
        self.role_color = color;
        self
    }

    /// Sets the avatar URL.
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

impl Principal for FakePrincipal {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn tag(&self) -> String {
        format!("{}#{:04}", self.name, self.discriminator)
    }

    fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    fn top_role_color(&self) -> u32 {
        self.role_color
    }

    fn mention(&self) -> String {
        format!("@{}", self.name)
    }

    fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c == name)
    }
}

// ============================================================================
// FakeMessage
// ============================================================================

/// One action the core asked the fake platform to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Embed(ReplyEmbed),
    Text(String),
    Reaction(String),
}

/// An incoming message that records every reply and reaction.
///
/// Wrap it in an `Arc` and coerce to [`SharedMessage`] to feed it through
/// the dispatcher, then inspect [`outgoing`](FakeMessage::outgoing):
///
/// ```rust,ignore
/// let msg = Arc::new(FakeMessage::new("!ping"));
/// dispatcher.handle(msg.clone()).await?;
/// assert_eq!(msg.reactions(), vec!["☑"]);
/// ```
///
/// [`SharedMessage`]: cogwork_core::SharedMessage
pub struct FakeMessage {
    content: String,
    origin: OriginId,
    author: Option<FakePrincipal>,
    from_self: bool,
    outbox: Mutex<Vec<Outgoing>>,
    reaction_failure: Mutex<Option<ApiError>>,
}

impl FakeMessage {
    /// Creates a message in origin `1` from a capability-less member
    /// called `tester`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: OriginId(1),
            author: Some(FakePrincipal::named("tester")),
            from_self: false,
            outbox: Mutex::new(Vec::new()),
            reaction_failure: Mutex::new(None),
        }
    }

    /// Sets the origin the message was sent in.
    pub fn in_origin(mut self, origin: OriginId) -> Self {
        self.origin = origin;
        self
    }

    /// Replaces the author.
    pub fn from_author(mut self, author: FakePrincipal) -> Self {
        self.author = Some(author);
        self
    }

    /// Makes the author a non-member principal (webhook, system message).
    pub fn without_author(mut self) -> Self {
        self.author = None;
        self
    }

    /// Marks the message as authored by the bot itself.
    pub fn from_self(mut self) -> Self {
        self.from_self = true;
        self
    }

    /// Scripts every reaction attempt to fail with the given error.
    pub fn failing_reactions_with(self, error: ApiError) -> Self {
        *self.reaction_failure.lock() = Some(error);
        self
    }

    /// Everything the core sent so far, in order.
    pub fn outgoing(&self) -> Vec<Outgoing> {
        self.outbox.lock().clone()
    }

    /// Just the embeds, in order.
    pub fn embeds(&self) -> Vec<ReplyEmbed> {
        self.outbox
            .lock()
            .iter()
            .filter_map(|o| match o {
                Outgoing::Embed(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Just the reaction emoji, in order.
    pub fn reactions(&self) -> Vec<String> {
        self.outbox
            .lock()
            .iter()
            .filter_map(|o| match o {
                Outgoing::Reaction(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessageView for FakeMessage {
    fn content(&self) -> &str {
        &self.content
    }

    fn origin(&self) -> OriginId {
        self.origin
    }

    fn author(&self) -> Option<&dyn Principal> {
        self.author.as_ref().map(|a| a as &dyn Principal)
    }

    fn author_is_self(&self) -> bool {
        self.from_self
    }

    async fn send_embed(&self, embed: &ReplyEmbed) -> ApiResult<()> {
        self.outbox.lock().push(Outgoing::Embed(embed.clone()));
        Ok(())
    }

    async fn send_text(&self, text: &str) -> ApiResult<()> {
        self.outbox.lock().push(Outgoing::Text(text.to_string()));
        Ok(())
    }

    async fn add_reaction(&self, emoji: &str) -> ApiResult<()> {
        if let Some(error) = self.reaction_failure.lock().clone() {
            return Err(error);
        }
        self.outbox.lock().push(Outgoing::Reaction(emoji.to_string()));
        Ok(())
    }
}

// ============================================================================
// FakeEvent
// ============================================================================

/// A named platform event with a free-form payload.
#[derive(Debug, Clone)]
pub struct FakeEvent {
    name: &'static str,
    /// Arbitrary payload for modules to downcast and read.
    pub payload: String,
}

impl FakeEvent {
    pub fn new(name: &'static str, payload: impl Into<String>) -> Self {
        Self {
            name,
            payload: payload.into(),
        }
    }
}

impl Event for FakeEvent {
    fn event_name(&self) -> &'static str {
        self.name
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Convenience: arc a [`FakeMessage`] for the dispatch pipeline while
/// keeping a handle for inspection.
pub fn shared(message: FakeMessage) -> Arc<FakeMessage> {
    Arc::new(message)
}
