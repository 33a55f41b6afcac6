//! Event abstraction for module fan-out.
//!
//! The core never interprets platform events; it only carries them from the
//! transport to every loaded module. Events are therefore type-erased behind
//! [`BoxedEvent`] and recovered by interested modules via downcasting:
//!
//! ```rust,ignore
//! if let Some(joined) = event.downcast_ref::<MemberJoined>() {
//!     info!(user = %joined.user, "welcome!");
//! }
//! ```

use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;

/// The base trait for platform events forwarded to modules.
pub trait Event: Send + Sync + 'static {
    /// Returns the human-readable name of this event type
    /// (e.g. `"on_message"`, `"on_member_join"`).
    fn event_name(&self) -> &'static str;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A type-erased, cheaply cloneable container for events.
///
/// Wraps any [`Event`] in an `Arc` so a single event instance can be shared
/// with every module without copying the payload.
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Creates a new `BoxedEvent` from any type implementing [`Event`].
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Returns the inner `Arc<dyn Event>`.
    pub fn inner(&self) -> &Arc<dyn Event> {
        &self.inner
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }
}

impl Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_name", &self.event_name())
            .finish()
    }
}

/// Receiver side of the event fan-out.
///
/// The transport layer calls [`dispatch`](EventSink::dispatch) for every
/// platform event, in addition to whatever handling it performs itself.
/// Implementations must not block: fan-out is scheduled independently of the
/// triggering event's own completion.
pub trait EventSink: Send + Sync {
    /// Hands an event over for fan-out. Returns immediately.
    fn dispatch(&self, event: BoxedEvent);
}
