//! # Cogwork Core
//!
//! The platform seam of the cogwork bot core.
//!
//! This crate defines the small set of abstractions the dispatch pipeline
//! needs from a chat platform, and nothing else. The transport (connection
//! handling, reconnects, rate limits, the concrete message/member/guild
//! objects) lives entirely on the other side of these traits.
//!
//! ## Contents
//!
//! - **Message seam**: [`MessageView`], [`Principal`], [`OriginId`]. The
//!   fields dispatch reads, plus the reply/reaction primitives it calls.
//! - **Reply values**: [`ReplyEmbed`] and friends. *What* to render is
//!   decided by the core; *how* to render it, by the platform.
//! - **Events**: [`Event`], [`BoxedEvent`], [`EventSink`]. Opaque platform
//!   events carried to module event hooks.
//! - **Errors**: [`ApiError`], the three platform failure shapes the core
//!   distinguishes.
//!
//! ```text
//! ┌───────────┐  MessageView / Event   ┌───────────────┐
//! │ Transport │───────────────────────▶│ cogwork       │
//! │ (platform)│◀───────────────────────│ (dispatch)    │
//! └───────────┘  ReplyEmbed / reaction └───────────────┘
//! ```

pub mod embed;
pub mod error;
pub mod event;
pub mod message;

pub use embed::{EmbedField, EmbedFooter, ReplyEmbed};
pub use error::{ApiError, ApiResult};
pub use event::{BoxedEvent, Event, EventSink};
pub use message::{MessageView, OriginId, Principal, SharedMessage};
