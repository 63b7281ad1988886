//! Standalone screen: redraws the shared display state at a fixed rate until the viewer quits
//! (q, Esc, Ctrl+C) or the process receives SIGINT.

use std::sync::Arc;

use anyhow::Context;
use scoreboard_back::{
    config::{AppConfig, StoreKind},
    dao::state_store::FileStateStore,
    render::{Renderer, TerminalSink},
    state::{AppState, time_source::SystemTimeSource},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    if config.store() == StoreKind::Memory {
        warn!("memory store cannot be shared across processes; reading the state file instead");
    }

    let store = FileStateStore::new(config.state_path(), config.default_state());
    let state = AppState::new(Arc::new(store), Arc::new(SystemTimeSource));
    info!(
        state_path = %config.state_path().display(),
        hz = config.render_hz(),
        "starting screen"
    );

    let sink = TerminalSink::stdout().context("taking over the terminal")?;
    Renderer::new(state, sink, config.render_interval())
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    info!("screen stopped");
    Ok(())
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
