//! Event system driving the connection manager.
//!
//! Everything that can change the manager's state arrives as a
//! [`ManagerEvent`] on a single channel, and the manager consumes that
//! channel from one task:
//!
//! 1. Transports emit [`TransportEvent`]s tagged with their [`Generation`].
//! 2. Reconnect timers emit `ReconnectDue` carrying their ticket.
//! 3. Collaborators emit [`ManagerCommand`]s through a `ManagerHandle`.

pub mod channels;
pub mod types;

pub use channels::{
    manager_event_channel, ManagerEventReceiver, ManagerEventSender, DEFAULT_CHANNEL_BUFFER,
};

pub use types::{Generation, ManagerCommand, ManagerEvent, TransportEvent};
