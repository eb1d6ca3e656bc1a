pub mod tasks;
pub mod ws;

pub use tasks::TaskSummary;
pub use ws::{
    ClientAction, InboundMessage, NotificationLevel, OrderUpdateKind, OutboundMessage,
};
