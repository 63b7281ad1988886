//! Scoreboard control server: HTTP control surface, status polling and display SSE, optionally with
//! the screen renderer running in the same process.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use scoreboard_back::{
    config::AppConfig,
    dao::state_store,
    render::{Renderer, TerminalSink},
    routes,
    services::sse_events,
    state::{AppState, SharedState, time_source::SystemTimeSource},
};
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = state_store::open(&config);
    let app_state = AppState::new(store, Arc::new(SystemTimeSource));

    tokio::spawn(sse_events::forward_degraded_changes(app_state.clone()));

    // Leaving the embedded screen (q, Esc, Ctrl+C) stops the server as well.
    let (screen_done_tx, screen_done_rx) = oneshot::channel::<()>();
    let screen = if config.embedded_screen() {
        info!(hz = config.render_hz(), "starting embedded screen");
        let sink = TerminalSink::stdout().context("taking over the terminal")?;
        let renderer = Renderer::new(app_state.clone(), sink, config.render_interval());
        Some(tokio::spawn(async move {
            renderer.run_until(shutdown_signal()).await;
            let _ = screen_done_tx.send(());
        }))
    } else {
        None
    };

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, state_path = %config.state_path().display(), "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown_signal() => {},
                Ok(()) = screen_done_rx => {},
            }
        })
        .await
        .context("serving axum")?;

    if let Some(screen) = screen {
        // Wait for the terminal to be restored before the process exits.
        if let Err(err) = screen.await {
            tracing::warn!(error = %err, "screen task failed");
        }
    }

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers. Logs go to stderr so an embedded screen owns stdout.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
