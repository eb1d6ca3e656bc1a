//! Event channel factory and handles.

use super::types::ManagerEvent;
use tokio::sync::mpsc;

/// Default buffer size for the manager event channel.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for ManagerEvent events.
pub type ManagerEventSender = mpsc::Sender<ManagerEvent>;
/// Receiver handle for ManagerEvent events.
pub type ManagerEventReceiver = mpsc::Receiver<ManagerEvent>;

/// Create a new ManagerEvent channel.
///
/// Returns a (sender, receiver) pair. Transports, timers and handles each
/// hold a clone of the sender; the manager owns the only receiver.
pub fn manager_event_channel() -> (ManagerEventSender, ManagerEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
