//! Narrow accessor to a running manager.

use tracing::warn;
use waitline_sdk::objects::{ClientAction, OutboundMessage};

use crate::events::{ManagerCommand, ManagerEvent, ManagerEventSender};

/// Cloneable handle for collaborators that need to talk to the manager.
///
/// Commands are processed on the manager's own task, in order with the
/// transport events that arrived before them.
#[derive(Debug, Clone)]
pub struct ManagerHandle {
    tx: ManagerEventSender,
}

impl ManagerHandle {
    pub(crate) fn new(tx: ManagerEventSender) -> Self {
        Self { tx }
    }

    /// Send `message` if the connection is open. Fire-and-forget.
    pub async fn send(&self, message: OutboundMessage) {
        self.command(ManagerCommand::Send(message)).await;
    }

    /// Send a typed action. Fire-and-forget.
    pub async fn send_action(&self, action: ClientAction) {
        match action.to_message() {
            Ok(message) => self.send(message).await,
            Err(e) => warn!(error = %e, action = ?action, "Failed to encode action"),
        }
    }

    /// Reset the reconnect counter and connect again.
    pub async fn reload(&self) {
        self.command(ManagerCommand::Reload).await;
    }

    async fn command(&self, command: ManagerCommand) {
        if self.tx.send(ManagerEvent::Command(command)).await.is_err() {
            warn!("Connection manager has stopped, command dropped");
        }
    }
}
