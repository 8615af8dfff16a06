//! Realtime Push Layer
//!
//! WebSocket endpoint plus the in-process hub that routes server events to
//! connected clients:
//! - [`hub`] - [`PushHub`]: user-addressed delivery and broadcast fan-out
//! - [`presence`] - [`PresenceTracker`]: who has announced themselves online
//! - [`ws`] - the `/ws` upgrade handler and socket loop
//!
//! Registration (being addressable) and presence (being shown as online) are
//! separate client actions; a client can receive targeted events without
//! ever appearing in the presence list.

pub mod hub;
pub mod presence;
pub mod ws;

pub use hub::{PushHub, ServerEvent};
pub use presence::PresenceTracker;
