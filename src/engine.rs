//! Engine loop: the single owner of time.
//!
//! [`Engine::tick`] is a synchronous step from (state, dt, input) to
//! (state, render snapshot) and never looks at a clock, so a recorded input
//! stream replayed with the same `dt` sequence and seed reproduces a game
//! exactly.  [`Engine::run`] wraps it in a real-time loop paced with
//! `std::time::Instant`.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::error::EngineError;
use crate::input::{InputProvider, InputSnapshot};
use crate::render::{RenderSnapshot, Renderer};
use crate::session::{Session, SessionState, StepReport};
use crate::spawner::{DifficultyCurve, StepCurve};
use crate::store::HighScoreStore;

/// Result of one tick.
#[derive(Clone, Debug)]
pub struct Frame {
    pub snapshot: RenderSnapshot,
    pub report: StepReport,
    /// State entered during this tick, if any.
    pub transition: Option<SessionState>,
    pub quit: bool,
}

pub struct Engine<S, C = StepCurve> {
    session: Session<C>,
    store: S,
    rng: StdRng,
    frame_time: Duration,
}

impl<S: HighScoreStore> Engine<S> {
    /// Seeds from `cfg.seed` when set, otherwise from entropy.
    pub fn new(cfg: &GameConfig, store: S) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(cfg, store, rng)
    }

    pub fn with_rng(cfg: &GameConfig, store: S, rng: StdRng) -> Self {
        let high_score = store.load_high_score();
        info!(high_score, "loaded high score");
        let session = Session::new(cfg, high_score);
        Self::with_session(session, store, rng)
    }
}

impl<S: HighScoreStore, C: DifficultyCurve> Engine<S, C> {
    /// Drive a pre-built session, e.g. one with several players or a custom
    /// difficulty curve.
    pub fn with_session(session: Session<C>, store: S, rng: StdRng) -> Self {
        let fps = session.config().screen.fps.max(1);
        let frame_time = Duration::from_secs_f64(1.0 / f64::from(fps));
        Self {
            session,
            store,
            rng,
            frame_time,
        }
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<C> {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The step the session will actually simulate for a measured `dt`.
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        self.session.clamp_dt(dt)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.session)
    }

    /// One engine step: commands, then (if PLAYING) simulation, then the
    /// render snapshot.
    pub fn tick(&mut self, dt: f32, input: &InputSnapshot) -> Frame {
        if input.quit {
            info!("quit requested");
            self.shutdown();
            return Frame {
                snapshot: self.snapshot(),
                report: StepReport::default(),
                transition: None,
                quit: true,
            };
        }

        let mut transition = self.session.handle_commands(input);
        let report = self.session.update(dt, input, &mut self.rng);
        if report.game_over {
            transition = Some(SessionState::GameOver);
            self.persist_high_score();
        }

        Frame {
            snapshot: self.snapshot(),
            report,
            transition,
            quit: false,
        }
    }

    /// Final flush: save the high score if it moved since the last save.
    pub fn shutdown(&mut self) {
        if self.session.ledger().needs_save() {
            self.persist_high_score();
        }
    }

    fn persist_high_score(&mut self) {
        let value = self.session.ledger().high_score();
        match self.store.save_high_score(value) {
            Ok(()) => self.session.ledger_mut().mark_saved(value),
            Err(e) => warn!(error = %e, high_score = value, "could not save high score"),
        }
    }

    /// Real-time loop.  Polls `input`, ticks with the measured frame time,
    /// renders, and sleeps out the rest of the frame.  Returns on quit.
    pub fn run<I, R>(&mut self, input: &mut I, renderer: &mut R) -> Result<(), EngineError>
    where
        I: InputProvider,
        R: Renderer,
    {
        let mut last = Instant::now();
        loop {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(last).as_secs_f32();
            last = frame_start;

            let snapshot = match input.poll() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    self.shutdown();
                    return Err(EngineError::Input(e));
                }
            };
            let frame = self.tick(dt, &snapshot);
            if frame.quit {
                return Ok(());
            }
            if let Err(e) = renderer.render(&frame.snapshot) {
                self.shutdown();
                return Err(EngineError::Render(e));
            }

            let spent = frame_start.elapsed();
            if spent < self.frame_time {
                thread::sleep(self.frame_time - spent);
            }
        }
    }
}
