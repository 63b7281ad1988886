//! Fixed-tick renderer: every tick loads the persisted state, projects it onto the current instant
//! and redraws the screen when the resulting frame differs from the last one drawn.

mod frame;
mod terminal;

use std::{future::Future, io, time::Duration};

use chrono::{Local, TimeZone};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{error::ServiceError, services::status_service, state::SharedState};

pub use self::{
    frame::{ACCENT, Frame, FrameLine},
    terminal::TerminalSink,
};

/// Destination of rendered frames.
pub trait FrameSink: Send {
    /// Replace whatever is on screen with `frame`.
    fn draw(&mut self, frame: &Frame) -> io::Result<()>;

    /// Whether the viewer asked to leave. Must not block.
    fn quit_requested(&mut self) -> io::Result<bool> {
        Ok(false)
    }

    /// Hand the screen back. Called once when the renderer stops.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The frame changed and was drawn.
    Drawn,
    /// The frame equals the one on screen.
    Unchanged,
}

/// Redraw loop bound to one display state.
pub struct Renderer<S, Z = Local> {
    state: SharedState,
    sink: S,
    zone: Z,
    period: Duration,
    last_frame: Option<Frame>,
    failing: bool,
}

impl<S: FrameSink> Renderer<S> {
    /// Renderer ticking every `period`, showing wall clock time in the host's local zone.
    ///
    /// The zone's offset is looked up on every tick, so daylight saving changes show up without a
    /// restart.
    pub fn new(state: SharedState, sink: S, period: Duration) -> Self {
        Self::with_zone(state, sink, Local, period)
    }
}

impl<S: FrameSink, Z: TimeZone + Send> Renderer<S, Z> {
    /// Renderer ticking every `period`, showing wall clock time in `zone`.
    pub fn with_zone(state: SharedState, sink: S, zone: Z, period: Duration) -> Self {
        Self {
            state,
            sink,
            zone,
            period,
            last_frame: None,
            failing: false,
        }
    }

    /// Last frame drawn, if any.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Load, project and draw once.
    pub async fn tick(&mut self) -> Result<TickOutcome, ServiceError> {
        let view = status_service::current_view(&self.state).await?;
        let frame = Frame::build(&view, &self.zone);
        if self.last_frame.as_ref() == Some(&frame) {
            return Ok(TickOutcome::Unchanged);
        }

        match self.sink.draw(&frame) {
            Ok(()) => {
                self.last_frame = Some(frame);
                Ok(TickOutcome::Drawn)
            }
            Err(err) => {
                // Retried next tick since the frame stays unrecorded.
                warn!(error = %err, "failed to draw frame");
                Ok(TickOutcome::Unchanged)
            }
        }
    }

    /// Tick until the sink reports a quit request. Failed ticks are logged and retried on the next
    /// cycle.
    pub async fn run(self) {
        self.run_until(futures::future::pending()).await
    }

    /// Tick until `shutdown` completes or the sink reports a quit request, then close the sink.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period = ?self.period, "renderer started");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            match self.sink.quit_requested() {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) => debug!(error = %err, "failed to read input"),
            }

            match self.tick().await {
                Ok(outcome) => {
                    if self.failing {
                        info!("renderer recovered");
                        self.failing = false;
                    }
                    if outcome == TickOutcome::Drawn {
                        debug!("frame redrawn");
                    }
                }
                Err(err) => {
                    if !self.failing {
                        warn!(error = %err, "render tick failed; retrying every tick");
                        self.failing = true;
                    }
                }
            }
        }

        if let Err(err) = self.sink.close() {
            warn!(error = %err, "failed to restore the screen");
        }
        info!("renderer stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use chrono::Utc;

    use super::*;
    use crate::{
        dao::state_store::{MemoryStateStore, StateStore},
        state::{
            AppState,
            display::{DisplayState, Mode},
            mutation::Mutation,
            time_source::{ManualTimeSource, TimeSource, Timestamp},
        },
    };

    #[derive(Clone, Default)]
    struct RecordingSink {
        frames: Arc<Mutex<Vec<Frame>>>,
        quit: Arc<AtomicBool>,
        closed: Arc<AtomicBool>,
    }

    impl FrameSink for RecordingSink {
        fn draw(&mut self, frame: &Frame) -> io::Result<()> {
            self.frames.lock().unwrap().push(frame.clone());
            Ok(())
        }

        fn quit_requested(&mut self) -> io::Result<bool> {
            Ok(self.quit.load(Ordering::SeqCst))
        }

        fn close(&mut self) -> io::Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn setup() -> (
        Renderer<RecordingSink, Utc>,
        RecordingSink,
        MemoryStateStore,
        ManualTimeSource,
    ) {
        let store = MemoryStateStore::new(DisplayState::default());
        let time = ManualTimeSource::new(Timestamp::from_millis(0));
        let state = AppState::new(Arc::new(store.clone()), Arc::new(time.clone()));
        let sink = RecordingSink::default();
        let renderer = Renderer::with_zone(state, sink.clone(), Utc, Duration::from_millis(16));
        (renderer, sink, store, time)
    }

    #[tokio::test]
    async fn redraws_only_when_frame_changes() {
        let (mut renderer, sink, _store, time) = setup();

        assert_eq!(renderer.tick().await.unwrap(), TickOutcome::Drawn);
        time.advance(Duration::from_millis(16));
        assert_eq!(renderer.tick().await.unwrap(), TickOutcome::Unchanged);
        time.advance(Duration::from_secs(1));
        assert_eq!(renderer.tick().await.unwrap(), TickOutcome::Drawn);

        assert_eq!(sink.frames.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn picks_up_mutations_from_the_store() {
        let (mut renderer, sink, store, time) = setup();
        renderer.tick().await.unwrap();

        let mut state = DisplayState::default();
        state.apply(
            Mutation::SetMode {
                mode: Mode::Stopwatch,
                message: None,
            },
            time.now(),
        );
        state.apply(Mutation::ToggleStopwatch, time.now());
        store.save(state).await.unwrap();

        time.advance(Duration::from_millis(500));
        assert_eq!(renderer.tick().await.unwrap(), TickOutcome::Drawn);
        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.last().unwrap().body[0].text, "00:00:00.50");
        assert_eq!(renderer.last_frame(), frames.last());
    }

    #[tokio::test]
    async fn shutdown_closes_the_sink() {
        let (renderer, sink, _store, _time) = setup();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let running = tokio::spawn(renderer.run_until(async {
            let _ = stop_rx.await;
        }));

        stop_tx.send(()).unwrap();
        running.await.unwrap();
        assert!(sink.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn quit_request_stops_the_loop() {
        let (renderer, sink, _store, _time) = setup();
        sink.quit.store(true, Ordering::SeqCst);

        tokio::time::timeout(Duration::from_secs(1), renderer.run())
            .await
            .unwrap();
        assert!(sink.closed.load(Ordering::SeqCst));
        assert!(sink.frames.lock().unwrap().is_empty());
    }
}
