//! Event type definitions for the connection manager.

use waitline_sdk::objects::OutboundMessage;

/// Identifies one transport instance.
///
/// The manager bumps its generation every time it creates a transport.
/// Events from any other generation belong to a superseded transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle and data signals of a single transport.
///
/// A transport emits `Opened` at most once and `Closed` exactly once,
/// last. `Error` is always followed by `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Text(String),
    Error(String),
    Closed,
}

/// Requests from collaborators outside the manager's task.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerCommand {
    /// Send a message if the connection is open, drop it otherwise.
    Send(OutboundMessage),
    /// Reset the attempt counter and connect again.
    Reload,
}

/// Everything the manager reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    Transport {
        generation: Generation,
        event: TransportEvent,
    },
    /// A reconnect timer elapsed.
    ReconnectDue { ticket: u64 },
    Command(ManagerCommand),
}
