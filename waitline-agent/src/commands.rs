//! Operator commands typed on stdin.
//!
//! | input | effect |
//! |---|---|
//! | `r`, `refresh` | refresh the task list |
//! | `reload` | reset the reconnect counter and connect again |
//! | `ack <id>` | acknowledge a notification |
//! | `q`, `quit` | stop the agent |

use std::io::BufRead;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use waitline_core::{ManagerHandle, TaskListRefresher};
use waitline_sdk::objects::ClientAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Refresh,
    Reload,
    Acknowledge(String),
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: ack <notification id>")]
    MissingId,
}

impl FromStr for OperatorCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        match words.next().unwrap_or_default() {
            "r" | "refresh" => Ok(OperatorCommand::Refresh),
            "reload" => Ok(OperatorCommand::Reload),
            "ack" => words
                .next()
                .map(|id| OperatorCommand::Acknowledge(id.to_string()))
                .ok_or(CommandError::MissingId),
            "q" | "quit" => Ok(OperatorCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Read stdin on a dedicated thread and forward non-empty lines.
///
/// A blocking thread keeps the tokio runtime free to shut down while a
/// read is still pending.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply operator commands until `quit`, end of input, or shutdown.
pub async fn run_operator_commands(
    handle: ManagerHandle,
    task_list: Arc<dyn TaskListRefresher>,
    shutdown_tx: watch::Sender<bool>,
) {
    let mut lines = spawn_stdin_reader();
    let mut shutdown_rx = shutdown_tx.subscribe();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,

            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("Operator input closed");
                    break;
                };
                match line.parse::<OperatorCommand>() {
                    Ok(OperatorCommand::Refresh) => task_list.refresh_task_list(),
                    Ok(OperatorCommand::Reload) => handle.reload().await,
                    Ok(OperatorCommand::Acknowledge(notification_id)) => {
                        handle
                            .send_action(ClientAction::Acknowledge { notification_id })
                            .await;
                    }
                    Ok(OperatorCommand::Quit) => {
                        info!("Quit requested by operator");
                        let _ = shutdown_tx.send(true);
                        break;
                    }
                    Err(e) => warn!("{e}"),
                }
            }
        }
    }
}
