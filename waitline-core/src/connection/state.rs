/// Lifecycle state of the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No transport, nothing scheduled.
    #[default]
    Disconnected,
    /// A transport was created and has not opened yet.
    Connecting,
    /// The transport is open; outbound messages are sent.
    Open,
    /// The transport closed and a reconnect timer is pending.
    RetryPending,
    /// Reconnect attempts are used up. Only a reload leaves this state.
    Exhausted,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::RetryPending => write!(f, "retry_pending"),
            ConnectionState::Exhausted => write!(f, "exhausted"),
        }
    }
}
