//! In-memory collaborators and transport for unit tests.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use url::Url;

use crate::collaborators::{
    Collaborators, Notification, OrderDisplay, PresentationSink, TaskListRefresher,
};
use crate::events::Generation;
use crate::transport::{Connector, TransportError, TransportEvents, TransportHandle};

#[derive(Default)]
struct Recorded {
    statuses: Vec<bool>,
    notifications: Vec<Notification>,
    refreshes: usize,
    orders: Vec<Value>,
}

/// Records every collaborator call.
#[derive(Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Recorded>>,
}

impl Recorder {
    pub fn sink(&self) -> Arc<dyn PresentationSink> {
        Arc::new(self.clone())
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(self.sink())
            .with_task_list(Arc::new(self.clone()))
            .with_order_display(Arc::new(self.clone()))
    }

    pub fn statuses(&self) -> Vec<bool> {
        self.inner.lock().unwrap().statuses.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().notifications.clone()
    }

    pub fn notification_texts(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.message).collect()
    }

    pub fn refreshes(&self) -> usize {
        self.inner.lock().unwrap().refreshes
    }

    pub fn orders(&self) -> Vec<Value> {
        self.inner.lock().unwrap().orders.clone()
    }
}

impl PresentationSink for Recorder {
    fn render_connection_status(&self, connected: bool) {
        self.inner.lock().unwrap().statuses.push(connected);
    }

    fn show_notification(&self, notification: Notification) {
        self.inner.lock().unwrap().notifications.push(notification);
    }
}

impl TaskListRefresher for Recorder {
    fn refresh_task_list(&self) {
        self.inner.lock().unwrap().refreshes += 1;
    }
}

impl OrderDisplay for Recorder {
    fn update_order_display(&self, order: &Value) {
        self.inner.lock().unwrap().orders.push(order.clone());
    }
}

#[derive(Default)]
struct Wire {
    opened: Vec<(Url, Generation)>,
    sent: Vec<(Generation, String)>,
    events: Vec<TransportEvents>,
    refuse: bool,
}

/// A connector whose transports never touch the network.
///
/// Tests inject lifecycle events by hand and inspect what was sent.
#[derive(Clone, Default)]
pub struct MockConnector {
    wire: Arc<Mutex<Wire>>,
}

impl MockConnector {
    /// Make every following `open` fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.wire.lock().unwrap().refuse = refuse;
    }

    pub fn opened(&self) -> Vec<(Url, Generation)> {
        self.wire.lock().unwrap().opened.clone()
    }

    pub fn sent(&self) -> Vec<(Generation, String)> {
        self.wire.lock().unwrap().sent.clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    /// The event emitter handed to the most recent transport.
    pub fn last_events(&self) -> Option<TransportEvents> {
        self.wire.lock().unwrap().events.last().cloned()
    }
}

pub struct MockHandle {
    generation: Generation,
    wire: Arc<Mutex<Wire>>,
}

impl TransportHandle for MockHandle {
    fn send_text(&self, text: String) -> Result<(), TransportError> {
        self.wire.lock().unwrap().sent.push((self.generation, text));
        Ok(())
    }
}

impl Connector for MockConnector {
    type Handle = MockHandle;

    fn open(&mut self, url: &Url, events: TransportEvents) -> Result<MockHandle, TransportError> {
        let mut wire = self.wire.lock().unwrap();
        if wire.refuse {
            return Err(TransportError::Refused("mock refuses connections".to_string()));
        }
        let generation = events.generation();
        wire.opened.push((url.clone(), generation));
        wire.events.push(events);
        Ok(MockHandle {
            generation,
            wire: Arc::clone(&self.wire),
        })
    }
}
