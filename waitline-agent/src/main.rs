//! Waitline Agent
//!
//! Keeps a waiter's terminal attached to the restaurant panel's real-time
//! channel: task alerts, order updates and server notifications.

mod commands;
mod config;
mod hooks;
mod identity;
mod shutdown;
mod terminal;

use clap::Parser;
use config::ConfigLoader;
use hooks::{HttpTaskList, OrderBoard};
use identity::ConfiguredIdentity;
use std::path::PathBuf;
use std::sync::Arc;
use terminal::TerminalSink;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;
use waitline_core::{Collaborators, ConnectionManager, TaskListRefresher, TungsteniteConnector};
use waitline_sdk::client::WaiterClient;

/// Waitline Agent - real-time waiter notifications in the terminal
#[derive(Parser, Debug)]
#[command(name = "waitline-agent")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./waitline.toml")]
    config: PathBuf,

    /// Override the waiter identity
    #[arg(short, long, env = "WAITLINE_WAITER_ID")]
    identity: Option<String>,

    /// Override the panel origin (e.g., https://panel.example.com)
    #[arg(short, long)]
    origin: Option<Url>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting waitline-agent v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.origin, args.identity);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Presentation and page hooks
    let sink = Arc::new(TerminalSink::stdout());
    let client = WaiterClient::new(config.origin.clone()).with_tasks_path(&config.tasks_path);
    let task_list: Arc<dyn TaskListRefresher> =
        Arc::new(HttpTaskList::new(client, Arc::clone(&sink)));
    let collaborators = Collaborators::new(sink.clone())
        .with_task_list(Arc::clone(&task_list))
        .with_order_display(Arc::new(OrderBoard::new(Arc::clone(&sink))));

    let identity = ConfiguredIdentity::from(&config.identity);
    let manager = ConnectionManager::new(
        config.origin,
        &identity,
        TungsteniteConnector::new(),
        collaborators,
    );
    if manager.identity().is_empty() {
        tracing::warn!("No waiter identity configured, connecting with an empty identity");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown::spawn_signal_handler(shutdown_tx.clone());
    tokio::spawn(commands::run_operator_commands(
        manager.handle(),
        Arc::clone(&task_list),
        shutdown_tx.clone(),
    ));

    // Show the initial task summary before the channel is up
    task_list.refresh_task_list();

    let result = tokio::spawn(manager.run(shutdown_rx)).await;

    // Stop the remaining tasks
    let _ = shutdown_tx.send(true);
    tracing::info!("Agent shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,waitline_core=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
