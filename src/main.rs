//! Counter - a persisted tally counter with a re-arming countdown
//!
//! This is the main entry point for the counter server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use counter::{
    config::Config,
    state::AppState,
    store::{FileStore, KeyValueStore, MemoryStore},
    api::create_router,
    tasks::completion_cue_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("counter={},tower_http=info", config.log_level()))
        .init();

    info!("Starting counter server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Configuration: host={}, port={}, store=memory", config.host, config.port);
        Arc::new(MemoryStore::new())
    } else {
        info!("Configuration: host={}, port={}, store={}",
              config.host, config.port, config.data_file.display());
        Arc::new(FileStore::open(&config.data_file))
    };

    // Create application state
    let state = Arc::new(AppState::new(store, config.port, config.host.clone()));

    // Play the completion cue in the background
    tokio::spawn(completion_cue_task(state.subscribe(), config.alert_command.clone()));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /increment  - Increment the count and restart the countdown");
    info!("  POST /decrement  - Decrement the count (no-op at 0)");
    info!("  POST /reset      - Reset the count to 0");
    info!("  POST /countdown  - Set the countdown duration in seconds");
    info!("  GET  /status     - Current count and countdown");
    info!("  GET  /events     - Server-sent event stream");
    info!("  GET  /health     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.teardown();
    info!("Server shutdown complete");
    Ok(())
}
