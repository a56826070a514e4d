use std::error::Error;
use std::net::SocketAddr;

use clap::Parser;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use desk_flow::app::{self, AppState};
use desk_flow::config::Config;
use desk_flow::store::Storage;
use desk_flow::tracker::Tracker;
use desk_flow::{logging, reminders};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    let layout = config.layout();
    logging::init(&layout.error_log())?;

    let storage = Storage::open(layout, config.max_backups)?;
    let state = AppState::new(Tracker::new(storage));

    // reminder scan runs until the server shuts down
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reminder_task = (!config.no_reminders)
        .then(|| reminders::spawn(state.tracker(), config.reminder_interval(), shutdown_rx));

    let app = app::router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    info!("API base:     http://{}/api", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = reminder_task {
        handle.await?;
    }
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}
