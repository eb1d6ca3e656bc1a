//! Transport abstraction.
//!
//! A [`Connector`] creates one transport per connection attempt and hands
//! back a [`TransportHandle`] for outbound text. The transport reports
//! its lifecycle through the [`TransportEvents`] it was opened with, so
//! every event it emits carries the generation it was created for.
//!
//! Dropping a handle closes its transport.

mod websocket;

pub use websocket::{TungsteniteConnector, TungsteniteHandle};

use thiserror::Error;
use url::Url;
use waitline_sdk::endpoint::EndpointError;

use crate::events::{Generation, ManagerEvent, ManagerEventSender, TransportEvent};

/// Errors that can occur while creating or using a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel address could not be derived.
    #[error("invalid address: {0}")]
    Endpoint(#[from] EndpointError),

    /// The connector could not create a transport.
    #[error("connection refused: {0}")]
    Refused(String),

    /// The transport is no longer running.
    #[error("transport is closed")]
    Closed,
}

/// Outbound side of a live transport.
pub trait TransportHandle: Send {
    /// Queue a text frame for transmission.
    fn send_text(&self, text: String) -> Result<(), TransportError>;
}

/// Creates transports.
pub trait Connector: Send {
    type Handle: TransportHandle;

    /// Start a transport towards `url`.
    ///
    /// Returns immediately; the open or failure of the connection is
    /// reported later through `events`.
    fn open(&mut self, url: &Url, events: TransportEvents) -> Result<Self::Handle, TransportError>;
}

/// Emits [`TransportEvent`]s for one generation into the manager channel.
#[derive(Debug, Clone)]
pub struct TransportEvents {
    generation: Generation,
    tx: ManagerEventSender,
}

impl TransportEvents {
    pub fn new(generation: Generation, tx: ManagerEventSender) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Deliver an event. Returns `false` once the manager is gone.
    pub async fn emit(&self, event: TransportEvent) -> bool {
        self.tx
            .send(ManagerEvent::Transport {
                generation: self.generation,
                event,
            })
            .await
            .is_ok()
    }
}
