//! Business logic powering the control routes. Every operation is one load → transform → save
//! transaction over the shared display state, followed by a push to display subscribers.

use tracing::{debug, info};

use crate::{
    dto::{
        control::{ModeRequest, ScoreboardUpdateRequest, TimerUpdateRequest},
        status::ClockStatus,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        Committed, SharedState,
        display::Team,
        mutation::{Mutation, TimerUpdate},
        projection::{ClockView, DisplayView},
    },
};

/// Apply `mutation` in its own transaction and notify display subscribers.
async fn commit(state: &SharedState, mutation: Mutation) -> Result<Committed<()>, ServiceError> {
    debug!(?mutation, "applying mutation");
    let committed = state
        .run_transaction(move |display, now| display.apply(mutation, now))
        .await?;

    let view = DisplayView::project(&committed.state, committed.now);
    sse_events::broadcast_display_updated(state, &view);
    Ok(committed)
}

/// Start the stopwatch when stopped, stop it when running.
pub async fn toggle_stopwatch(state: &SharedState) -> Result<ClockStatus, ServiceError> {
    let committed = commit(state, Mutation::ToggleStopwatch).await?;
    let view = ClockView::project(&committed.state.stopwatch, committed.now);
    info!(running = view.running, elapsed = %view.formatted(), "stopwatch toggled");
    Ok(ClockStatus::from(&view))
}

/// Zero and stop the stopwatch.
pub async fn reset_stopwatch(state: &SharedState) -> Result<ClockStatus, ServiceError> {
    let committed = commit(state, Mutation::ResetStopwatch).await?;
    info!("stopwatch reset");
    Ok(ClockStatus::from(&ClockView::project(
        &committed.state.stopwatch,
        committed.now,
    )))
}

/// Start the game clock when stopped, stop it when running.
pub async fn toggle_game_clock(state: &SharedState) -> Result<(), ServiceError> {
    let committed = commit(state, Mutation::ToggleGameClock).await?;
    info!(
        running = committed.state.game_clock.is_running(),
        "game clock toggled"
    );
    Ok(())
}

/// Zero and stop the game clock.
pub async fn reset_game_clock(state: &SharedState) -> Result<(), ServiceError> {
    commit(state, Mutation::ResetGameClock).await?;
    info!("game clock reset");
    Ok(())
}

/// Drive the countdown timer.
pub async fn update_timer(
    state: &SharedState,
    request: TimerUpdateRequest,
) -> Result<(), ServiceError> {
    let update = TimerUpdate::try_from(request)?;
    let committed = commit(state, Mutation::UpdateTimer(update)).await?;
    info!(
        running = committed.state.timer.is_running(),
        duration = ?committed.state.timer.target(),
        "timer updated"
    );
    Ok(())
}

/// Switch the active view, optionally replacing the message.
pub async fn set_mode(state: &SharedState, request: ModeRequest) -> Result<(), ServiceError> {
    let mode = request.mode;
    commit(
        state,
        Mutation::SetMode {
            mode,
            message: request.message,
        },
    )
    .await?;
    info!(?mode, "display mode changed");
    Ok(())
}

/// Replace the teams and show the scoreboard.
pub async fn update_scoreboard(
    state: &SharedState,
    request: ScoreboardUpdateRequest,
) -> Result<(), ServiceError> {
    let teams: Vec<Team> = request.teams.into_iter().map(Into::into).collect();
    let count = teams.len();
    commit(state, Mutation::UpdateScoreboard(teams)).await?;
    info!(count, "scoreboard updated");
    Ok(())
}
