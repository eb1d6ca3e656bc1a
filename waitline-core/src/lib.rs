#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod collaborators;
pub mod connection;
pub mod events;
pub mod router;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::{
    Collaborators, IdentityResolver, Notification, OrderDisplay, PresentationSink,
    StaticIdentity, TaskListRefresher, NOTIFICATION_DISPLAY_WINDOW,
};
pub use connection::{ConnectionManager, ConnectionState, ManagerHandle, ReconnectPolicy};
pub use router::MessageRouter;
pub use transport::{
    Connector, TransportError, TransportEvents, TransportHandle, TungsteniteConnector,
};
