//! WebSocket transport over `tokio-tungstenite`.
//!
//! Each `open` spawns one task that owns the socket for its whole life:
//!
//! 1. Connects; on failure emits `Error` then `Closed`.
//! 2. Emits `Opened`, then relays inbound text frames as `Text` and
//!    writes the text queued through the handle.
//! 3. Stops on a close frame, a socket error, end of stream, or when the
//!    handle is dropped, and emits `Closed` exactly once.
//!
//! The socket task runs under a supervisor so a panic inside it still
//! ends the generation with `Error` and `Closed`.

use std::future::Future;
use std::sync::Once;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};
use url::Url;

use super::{Connector, TransportError, TransportEvents, TransportHandle};
use crate::events::TransportEvent;

/// Opens real WebSocket connections.
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

/// Outbound queue of one WebSocket task.
#[derive(Debug)]
pub struct TungsteniteHandle {
    outbound: mpsc::UnboundedSender<String>,
}

impl TransportHandle for TungsteniteHandle {
    fn send_text(&self, text: String) -> Result<(), TransportError> {
        self.outbound.send(text).map_err(|_| TransportError::Closed)
    }
}

impl Connector for TungsteniteConnector {
    type Handle = TungsteniteHandle;

    fn open(&mut self, url: &Url, events: TransportEvents) -> Result<Self::Handle, TransportError> {
        install_crypto_provider();

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        spawn_supervised(events.clone(), drive(url.clone(), events, outbound_rx));
        Ok(TungsteniteHandle { outbound })
    }
}

/// `wss://` needs a process-wide rustls provider; install ring's once.
fn install_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Run `task` and close the generation if it panics before doing so itself.
fn spawn_supervised<F>(events: TransportEvents, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        match tokio::spawn(task).await {
            Err(e) if e.is_panic() => {
                error!(generation = %events.generation(), "WebSocket task panicked");
                events
                    .emit(TransportEvent::Error("transport task panicked".to_string()))
                    .await;
                events.emit(TransportEvent::Closed).await;
            }
            _ => {}
        }
    });
}

async fn drive(url: Url, events: TransportEvents, mut outbound_rx: mpsc::UnboundedReceiver<String>) {
    let generation = events.generation();

    let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            debug!(generation = %generation, error = %e, "WebSocket connect failed");
            events.emit(TransportEvent::Error(e.to_string())).await;
            events.emit(TransportEvent::Closed).await;
            return;
        }
    };

    if !events.emit(TransportEvent::Opened).await {
        return;
    }

    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            frame = source.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if !events.emit(TransportEvent::Text(text)).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(generation = %generation, frame = ?frame, "Server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        events.emit(TransportEvent::Error(e.to_string())).await;
                        break;
                    }
                    None => break,
                }
            }

            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            warn!(generation = %generation, error = %e, "Failed to write frame");
                            events.emit(TransportEvent::Error(e.to_string())).await;
                            break;
                        }
                    }
                    None => {
                        // Handle dropped: the manager has moved on.
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    events.emit(TransportEvent::Closed).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{manager_event_channel, Generation, ManagerEvent};
    use tokio::net::TcpListener;

    fn transport_event(event: Option<ManagerEvent>) -> (Generation, TransportEvent) {
        match event {
            Some(ManagerEvent::Transport { generation, event }) => (generation, event),
            other => unreachable!("expected a transport event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_round_trip_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let first = ws.next().await.unwrap().unwrap();
            ws.send(Message::Text(r#"{"type":"waiter_task"}"#.to_string()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
            first
        });

        let (tx, mut rx) = manager_event_channel();
        let generation = Generation::default().next();
        let url = Url::parse(&format!("ws://{addr}/ws/waiters/1/")).unwrap();
        let handle = TungsteniteConnector::new()
            .open(&url, TransportEvents::new(generation, tx))
            .unwrap();

        assert_eq!(
            transport_event(rx.recv().await),
            (generation, TransportEvent::Opened)
        );

        handle.send_text(r#"{"action":"get_tasks"}"#.to_string()).unwrap();

        assert_eq!(
            transport_event(rx.recv().await),
            (generation, TransportEvent::Text(r#"{"type":"waiter_task"}"#.to_string()))
        );
        assert_eq!(
            transport_event(rx.recv().await),
            (generation, TransportEvent::Closed)
        );

        let first = server.await.unwrap();
        assert_eq!(first, Message::Text(r#"{"action":"get_tasks"}"#.to_string()));
    }

    #[tokio::test]
    async fn test_tls_handshake_failure_reports_error_then_close() {
        // Plain TCP server: the TLS handshake of a wss:// connect must fail
        // cleanly instead of taking the socket task down.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            drop(tcp);
        });

        let (tx, mut rx) = manager_event_channel();
        let generation = Generation::default().next();
        let url = Url::parse(&format!("wss://{addr}/ws/waiters/1/")).unwrap();
        let _handle = TungsteniteConnector::new()
            .open(&url, TransportEvents::new(generation, tx))
            .unwrap();

        let (g, event) = transport_event(rx.recv().await);
        assert_eq!(g, generation);
        assert!(matches!(event, TransportEvent::Error(_)));
        assert_eq!(
            transport_event(rx.recv().await),
            (generation, TransportEvent::Closed)
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_panicking_task_still_closes_generation() {
        let (tx, mut rx) = manager_event_channel();
        let generation = Generation::default().next();
        let events = TransportEvents::new(generation, tx);

        spawn_supervised(events, async {
            None::<u8>.unwrap();
        });

        let (g, event) = transport_event(rx.recv().await);
        assert_eq!(g, generation);
        assert!(matches!(event, TransportEvent::Error(_)));
        assert_eq!(
            transport_event(rx.recv().await),
            (generation, TransportEvent::Closed)
        );
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_then_close() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (tx, mut rx) = manager_event_channel();
        let generation = Generation::default().next();
        let url = Url::parse(&format!("ws://{addr}/ws/waiters/1/")).unwrap();
        let _handle = TungsteniteConnector::new()
            .open(&url, TransportEvents::new(generation, tx))
            .unwrap();

        let (g, event) = transport_event(rx.recv().await);
        assert_eq!(g, generation);
        assert!(matches!(event, TransportEvent::Error(_)));
        assert_eq!(
            transport_event(rx.recv().await),
            (generation, TransportEvent::Closed)
        );
    }
}
