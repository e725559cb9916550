// Chat widget entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the endpoint client
// 4. Create mpsc channels and the session state
// 5. Spawn the app loop
// 6. Run the TUI until the user quits
// 7. Wait briefly for the app loop to finish

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use chat_widget::app;
use chat_widget::client::HttpBackend;
use chat_widget::config;
use chat_widget::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Chat widget starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: endpoint={}", config.endpoint.url);

    let backend = HttpBackend::from_config(&config);
    let endpoint = backend.url().to_string();

    let (backend_tx, backend_rx) = mpsc::channel(8);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let state = app::AppState::new(&config, Arc::new(backend), backend_tx);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, backend_rx, ui_tx, state).await {
            error!("Application loop error: {}", e);
        }
    });

    // Blocks until the user quits (Esc or Ctrl+C).
    if let Err(e) = tui::run(ui_rx, cmd_tx, tui::ViewState::new(endpoint)).await {
        error!("TUI error: {:#}", e);
    }

    // The TUI dropped cmd_tx on exit, which also ends the app loop.
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), app_handle).await;

    info!("Chat widget shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("chat-widget.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_widget=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
