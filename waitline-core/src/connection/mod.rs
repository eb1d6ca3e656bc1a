//! Connection manager.
//!
//! The `ConnectionManager` is responsible for:
//! - Owning the single live transport and the generation it belongs to
//! - Sending `{"action":"get_tasks"}` each time the connection opens
//! - Routing inbound frames through the [`MessageRouter`]
//! - Scheduling bounded, linearly backed-off reconnects after a close
//! - Reporting connection health and retry exhaustion to the presentation sink
//!
//! All state is mutated from the task running [`ConnectionManager::run`].
//! Transports, reconnect timers and [`ManagerHandle`]s only post events.

mod handle;
mod policy;
mod state;

pub use handle::ManagerHandle;
pub use policy::{BASE_RECONNECT_DELAY, MAX_RECONNECT_ATTEMPTS, ReconnectPolicy};
pub use state::ConnectionState;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;
use waitline_sdk::endpoint::waiter_channel_url;
use waitline_sdk::objects::{ClientAction, NotificationLevel, OutboundMessage};

use crate::collaborators::{Collaborators, IdentityResolver, Notification, PresentationSink};
use crate::events::{
    Generation, ManagerCommand, ManagerEvent, ManagerEventReceiver, ManagerEventSender,
    TransportEvent, manager_event_channel,
};
use crate::router::MessageRouter;
use crate::transport::{Connector, TransportError, TransportEvents, TransportHandle};

/// Shown once when reconnect attempts are used up.
pub const EXHAUSTED_MESSAGE: &str = "Connection lost - please refresh the page";

/// A reconnect timer that has not fired yet.
#[derive(Debug)]
struct PendingReconnect {
    ticket: u64,
    attempt: u32,
    delay: Duration,
    timer: JoinHandle<()>,
}

/// Owns the waiter channel connection and its reconnect schedule.
pub struct ConnectionManager<C: Connector> {
    origin: Url,
    identity: String,
    connector: C,
    router: MessageRouter,
    presentation: Arc<dyn PresentationSink>,
    policy: ReconnectPolicy,

    state: ConnectionState,
    generation: Generation,
    transport: Option<C::Handle>,
    reconnect_attempts: u32,
    pending_reconnect: Option<PendingReconnect>,
    next_ticket: u64,
    exhaustion_reported: bool,

    events_tx: ManagerEventSender,
    events_rx: ManagerEventReceiver,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a new ConnectionManager.
    ///
    /// # Arguments
    ///
    /// * `origin` - Origin of the waiter panel; the channel address is derived from it
    /// * `identity` - Resolved once here; immutable afterwards
    /// * `connector` - Creates a transport per connection attempt
    /// * `collaborators` - Presentation sink and page hooks
    pub fn new(
        origin: Url,
        identity: &dyn IdentityResolver,
        connector: C,
        collaborators: Collaborators,
    ) -> Self {
        let (events_tx, events_rx) = manager_event_channel();
        Self {
            origin,
            identity: identity.resolve(),
            connector,
            presentation: Arc::clone(&collaborators.presentation),
            router: MessageRouter::new(collaborators),
            policy: ReconnectPolicy::default(),
            state: ConnectionState::Disconnected,
            generation: Generation::default(),
            transport: None,
            reconnect_attempts: 0,
            pending_reconnect: None,
            next_ticket: 0,
            exhaustion_reported: false,
            events_tx,
            events_rx,
        }
    }

    /// A handle collaborators can use to send messages or request a reload.
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle::new(self.events_tx.clone())
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Attempt number and delay of the pending reconnect, if any.
    pub fn pending_reconnect(&self) -> Option<(u32, Duration)> {
        self.pending_reconnect
            .as_ref()
            .map(|pending| (pending.attempt, pending.delay))
    }

    /// Run the ConnectionManager until `shutdown_rx` turns `true`.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(identity = %self.identity, "ConnectionManager started");

        self.connect();

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("ConnectionManager received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event);
                }

                else => {
                    info!("Manager event channel closed");
                    break;
                }
            }
        }

        self.cancel_pending_reconnect();
        self.transport = None;
        self.state = ConnectionState::Disconnected;

        info!("ConnectionManager shutdown complete");
    }

    /// Create a new transport, replacing the current one.
    ///
    /// Any pending reconnect is cancelled. A transport that cannot even be
    /// created is handled like an error followed by a close.
    pub fn connect(&mut self) {
        self.cancel_pending_reconnect();

        // Dropping the old handle closes it; its late events carry a stale
        // generation and are ignored.
        self.transport = None;
        self.generation = self.generation.next();
        self.state = ConnectionState::Connecting;

        let generation = self.generation;
        let opened = match waiter_channel_url(&self.origin, &self.identity) {
            Ok(url) => {
                info!(generation = %generation, url = %url, "Connecting");
                let events = TransportEvents::new(generation, self.events_tx.clone());
                self.connector.open(&url, events)
            }
            Err(e) => Err(TransportError::from(e)),
        };

        match opened {
            Ok(handle) => self.transport = Some(handle),
            Err(e) => {
                error!(generation = %generation, error = %e, "WebSocket connection error");
                self.state = ConnectionState::Disconnected;
                self.presentation.render_connection_status(false);
                self.schedule_reconnect();
            }
        }
    }

    /// Reset the attempt counter and connect again.
    ///
    /// This is the manual way out of [`ConnectionState::Exhausted`].
    pub fn reload(&mut self) {
        info!(state = %self.state, "Reloading connection");
        self.reconnect_attempts = 0;
        self.exhaustion_reported = false;
        self.connect();
    }

    /// Send `message` if the connection is open; drop it with a warning otherwise.
    pub fn send(&self, message: &OutboundMessage) {
        let transport = match (&self.state, &self.transport) {
            (ConnectionState::Open, Some(transport)) => transport,
            _ => {
                warn!(state = %self.state, message = ?message, "WebSocket not ready, message not sent");
                return;
            }
        };

        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to encode outbound message");
                return;
            }
        };

        if let Err(e) = transport.send_text(text) {
            warn!(generation = %self.generation, error = %e, "Failed to send message");
        }
    }

    /// Send a typed action; see [`send`](Self::send).
    pub fn send_action(&self, action: &ClientAction) {
        match action.to_message() {
            Ok(message) => self.send(&message),
            Err(e) => error!(error = %e, action = ?action, "Failed to encode action"),
        }
    }

    /// Apply one event to the state machine.
    pub fn handle_event(&mut self, event: ManagerEvent) {
        match event {
            ManagerEvent::Transport { generation, event } => {
                if generation != self.generation {
                    debug!(
                        generation = %generation,
                        current = %self.generation,
                        event = ?event,
                        "Ignoring event from superseded transport"
                    );
                    return;
                }
                match event {
                    TransportEvent::Opened => self.on_open(),
                    TransportEvent::Text(text) => self.router.dispatch(&text),
                    TransportEvent::Error(reason) => self.on_error(&reason),
                    TransportEvent::Closed => self.on_close(),
                }
            }
            ManagerEvent::ReconnectDue { ticket } => self.on_reconnect_due(ticket),
            ManagerEvent::Command(ManagerCommand::Send(message)) => self.send(&message),
            ManagerEvent::Command(ManagerCommand::Reload) => self.reload(),
        }
    }

    fn on_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            debug!(state = %self.state, "Ignoring duplicate open");
            return;
        }

        info!(generation = %self.generation, "WebSocket connected");
        self.state = ConnectionState::Open;
        self.reconnect_attempts = 0;
        self.exhaustion_reported = false;
        self.cancel_pending_reconnect();
        self.presentation.render_connection_status(true);

        self.send_action(&ClientAction::GetTasks);
    }

    fn on_error(&mut self, reason: &str) {
        error!(generation = %self.generation, error = %reason, "WebSocket error");
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            self.state = ConnectionState::Disconnected;
        }
        self.presentation.render_connection_status(false);
    }

    fn on_close(&mut self) {
        if matches!(
            self.state,
            ConnectionState::RetryPending | ConnectionState::Exhausted
        ) {
            debug!(generation = %self.generation, "Ignoring duplicate close");
            return;
        }

        info!(generation = %self.generation, "WebSocket disconnected");
        self.transport = None;
        self.state = ConnectionState::Disconnected;
        self.presentation.render_connection_status(false);
        self.schedule_reconnect();
    }

    fn on_reconnect_due(&mut self, ticket: u64) {
        match &self.pending_reconnect {
            Some(pending) if pending.ticket == ticket => {
                self.pending_reconnect = None;
                self.connect();
            }
            _ => debug!(ticket, "Ignoring cancelled reconnect timer"),
        }
    }

    fn schedule_reconnect(&mut self) {
        self.cancel_pending_reconnect();

        if !self.policy.allows(self.reconnect_attempts) {
            self.state = ConnectionState::Exhausted;
            error!(
                attempts = self.reconnect_attempts,
                "Max reconnection attempts reached"
            );
            if !self.exhaustion_reported {
                self.exhaustion_reported = true;
                self.presentation.show_notification(Notification::new(
                    EXHAUSTED_MESSAGE,
                    NotificationLevel::Error,
                ));
            }
            return;
        }

        self.reconnect_attempts += 1;
        let attempt = self.reconnect_attempts;
        let delay = self.policy.delay_for(attempt);
        self.next_ticket += 1;
        let ticket = self.next_ticket;

        info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting in {}ms (attempt {})",
            delay.as_millis(),
            attempt
        );

        let tx = self.events_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ManagerEvent::ReconnectDue { ticket }).await;
        });

        self.pending_reconnect = Some(PendingReconnect {
            ticket,
            attempt,
            delay,
            timer,
        });
        self.state = ConnectionState::RetryPending;
    }

    fn cancel_pending_reconnect(&mut self) {
        if let Some(pending) = self.pending_reconnect.take() {
            debug!(attempt = pending.attempt, "Cancelling pending reconnect");
            pending.timer.abort();
        }
    }
}
