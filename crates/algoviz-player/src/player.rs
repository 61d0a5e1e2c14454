//! The step scheduler.
//!
//! A run is one spawned task that applies a step, renders it, mirrors it to
//! the pseudocode panels and then sleeps. The sleep is the only suspension
//! point. Model, renderer, panels and status share one mutex, so control
//! calls never interleave with a step being applied.
//!
//! Every run gets a generation number. A loop whose generation is no longer
//! current exits at its next wake-up without touching anything, which is
//! what makes `stop` cooperative.

use std::sync::Arc;
use std::time::Duration;

use algoviz_core::{Algorithm, Listing, Snapshot, Step, StepMetrics, StepProgram, VisualModel};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::code_sync::{CodeSync, PanelView};
use crate::error::{Error, Result};
use crate::render::{Frame, Renderer};
use crate::speed::{clamp_delay, SpeedLevel, MIN_DELAY_MS};

/// Player configuration.
#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig {
    pub speed_level: SpeedLevel,
    /// Smallest delay between two steps
    pub floor_ms: u64,
    /// Capacity of the event channel
    pub event_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed_level: SpeedLevel::default(),
            floor_ms: MIN_DELAY_MS,
            event_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl PlayerStatus {
    /// Whether a run owns the player.
    pub fn is_active(&self) -> bool {
        matches!(self, PlayerStatus::Running | PlayerStatus::Paused)
    }
}

/// Progress of the current or last run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub algorithm: Option<Algorithm>,
    /// Number of steps applied so far.
    pub current_step: usize,
    pub total_steps: usize,
    pub status: PlayerStatus,
    pub speed_ms: u64,
    pub metrics: StepMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Final statistics of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub algorithm: Algorithm,
    pub duration_ms: u64,
    pub comparisons: u64,
    pub swaps: u64,
    pub operations: u64,
    pub steps: usize,
    pub steps_per_second: f64,
}

/// Answer to [`Player::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    Started,
    /// A run is already active; nothing changed.
    AlreadyRunning,
    /// The baseline could not be drawn. The player is idle with `last_error` set.
    Failed,
}

/// Everything the player reports to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    Started {
        algorithm: Algorithm,
        total_steps: usize,
        snapshot: Snapshot,
    },
    Step {
        index: usize,
        total_steps: usize,
        /// Time since the run started.
        elapsed_ms: u64,
        step: Step,
        snapshot: Snapshot,
    },
    Paused { at: usize },
    Resumed { at: usize },
    Stopped { at: usize },
    Completed { report: RunReport },
    Failed { at: usize, error: String },
    Rejected { reason: String },
}

struct Stage<R> {
    renderer: R,
    code_sync: CodeSync,
    program: Option<Arc<StepProgram>>,
    model: Option<Box<dyn VisualModel>>,
    status: PlayerStatus,
    current: usize,
    metrics: StepMetrics,
    speed_ms: u64,
    generation: u64,
    started: Option<Instant>,
    last_error: Option<String>,
    last_report: Option<RunReport>,
}

impl<R: Renderer> Stage<R> {
    fn progress(&self) -> Progress {
        Progress {
            algorithm: self.program.as_ref().map(|p| p.algorithm()),
            current_step: self.current,
            total_steps: self.program.as_ref().map_or(0, |p| p.len()),
            status: self.status,
            speed_ms: self.speed_ms,
            metrics: self.metrics,
            last_error: self.last_error.clone(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.map_or(0, |t| t.elapsed().as_millis() as u64)
    }

    /// Apply, draw and mirror the next step. `None` once the program is exhausted.
    fn advance(&mut self) -> Result<Option<(usize, Step, Snapshot)>> {
        let program = self.program.clone().ok_or(Error::NoProgram)?;
        let Some(step) = program.steps().get(self.current).cloned() else {
            return Ok(None);
        };
        // stepped on a copy so a failed draw leaves the model as it was
        let mut next = self.model.as_ref().ok_or(Error::NoProgram)?.clone();
        next.apply(&step)?;
        let snapshot = next.snapshot();
        if step.mutation.is_some() {
            self.renderer.reflow(&snapshot)?;
        }
        let index = self.current;
        self.renderer.draw(&snapshot, &Frame::for_step(index, &step))?;
        self.model = Some(next);
        self.metrics += step.metrics;
        self.code_sync.apply(&step);
        self.current += 1;
        Ok(Some((index, step, snapshot)))
    }

    /// Lay out and draw `snapshot` with no emphasis.
    fn redraw(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.renderer.reflow(snapshot)?;
        self.renderer.draw(snapshot, &Frame::idle())
    }

    fn clear(&mut self) {
        self.renderer.clear_highlights();
        self.code_sync.clear_all();
    }

    fn report(&self, algorithm: Algorithm) -> RunReport {
        let duration_ms = self.elapsed_ms();
        let steps_per_second = if duration_ms == 0 {
            0.0
        } else {
            self.current as f64 * 1000.0 / duration_ms as f64
        };
        RunReport {
            algorithm,
            duration_ms,
            comparisons: self.metrics.comparisons,
            swaps: self.metrics.swaps,
            operations: self.metrics.operations,
            steps: self.current,
            steps_per_second,
        }
    }
}

struct Shared<R> {
    stage: Mutex<Stage<R>>,
    wake: Notify,
    events: broadcast::Sender<PlayerEvent>,
    floor_ms: u64,
}

impl<R> Shared<R> {
    fn publish(&self, event: PlayerEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Plays step programs against a renderer.
///
/// Cloning yields another handle to the same player.
pub struct Player<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for Player<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Renderer + 'static> Player<R> {
    pub fn new(renderer: R, config: PlayerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let floor_ms = config.floor_ms.max(MIN_DELAY_MS);
        Self {
            shared: Arc::new(Shared {
                stage: Mutex::new(Stage {
                    renderer,
                    code_sync: CodeSync::new(),
                    program: None,
                    model: None,
                    status: PlayerStatus::Idle,
                    current: 0,
                    metrics: StepMetrics::default(),
                    speed_ms: clamp_delay(config.speed_level.delay_ms(), floor_ms),
                    generation: 0,
                    started: None,
                    last_error: None,
                    last_report: None,
                }),
                wake: Notify::new(),
                events,
                floor_ms,
            }),
        }
    }

    /// Begin playing `program` from its baseline.
    ///
    /// Must be called within a tokio runtime. While a run is active (running
    /// or paused) the call is a no-op that reports [`StartOutcome::AlreadyRunning`].
    pub async fn start(&self, program: StepProgram) -> StartOutcome {
        let mut stage = self.shared.stage.lock().await;
        if stage.status.is_active() {
            warn!(current = stage.current, "start rejected: a run is active");
            self.shared.publish(PlayerEvent::Rejected {
                reason: "a run is already active".into(),
            });
            return StartOutcome::AlreadyRunning;
        }

        let algorithm = program.algorithm();
        let total_steps = program.len();
        let model = program.fresh_model();
        let snapshot = model.snapshot();

        stage.generation += 1;
        stage.program = Some(Arc::new(program));
        stage.model = Some(model);
        stage.status = PlayerStatus::Running;
        stage.current = 0;
        stage.metrics = StepMetrics::default();
        stage.last_error = None;
        stage.last_report = None;
        stage.started = Some(Instant::now());
        stage.clear();
        if let Err(e) = stage.redraw(&snapshot) {
            self.fail(&mut stage, e);
            return StartOutcome::Failed;
        }

        info!(%algorithm, steps = total_steps, speed_ms = stage.speed_ms, "run started");
        self.shared.publish(PlayerEvent::Started {
            algorithm,
            total_steps,
            snapshot,
        });

        let generation = stage.generation;
        drop(stage);
        tokio::spawn(run(Arc::clone(&self.shared), generation));
        StartOutcome::Started
    }

    /// Hold at the next step boundary. A delay already in progress still completes.
    pub async fn pause(&self) -> Progress {
        let mut stage = self.shared.stage.lock().await;
        if stage.status == PlayerStatus::Running {
            stage.status = PlayerStatus::Paused;
            info!(at = stage.current, "run paused");
            self.shared.publish(PlayerEvent::Paused { at: stage.current });
        }
        stage.progress()
    }

    pub async fn resume(&self) -> Progress {
        let mut stage = self.shared.stage.lock().await;
        if stage.status == PlayerStatus::Paused {
            stage.status = PlayerStatus::Running;
            info!(at = stage.current, "run resumed");
            self.shared.publish(PlayerEvent::Resumed { at: stage.current });
            self.shared.wake.notify_one();
        }
        stage.progress()
    }

    /// Abort the run and clear every highlight. The position cannot be resumed.
    pub async fn stop(&self) -> Progress {
        let mut stage = self.shared.stage.lock().await;
        self.halt(&mut stage);
        stage.progress()
    }

    /// Stop any run and return the model to its baseline. The last report is dropped.
    pub async fn reset(&self) -> Progress {
        let mut stage = self.shared.stage.lock().await;
        self.halt(&mut stage);
        if let Some(program) = stage.program.clone() {
            let model = program.fresh_model();
            let snapshot = model.snapshot();
            stage.model = Some(model);
            stage.current = 0;
            stage.metrics = StepMetrics::default();
            stage.last_error = None;
            stage.last_report = None;
            if let Err(e) = stage.redraw(&snapshot) {
                warn!(error = %e, "redraw after reset failed");
                stage.last_error = Some(e.to_string());
            }
        }
        stage.progress()
    }

    /// Use `ms` between subsequent steps, raised to the floor. Returns the delay in effect.
    pub async fn set_speed_ms(&self, ms: u64) -> u64 {
        let mut stage = self.shared.stage.lock().await;
        stage.speed_ms = clamp_delay(ms, self.shared.floor_ms);
        debug!(speed_ms = stage.speed_ms, "speed changed");
        stage.speed_ms
    }

    pub async fn set_speed_level(&self, level: SpeedLevel) -> u64 {
        self.set_speed_ms(level.delay_ms()).await
    }

    pub async fn progress(&self) -> Progress {
        self.shared.stage.lock().await.progress()
    }

    pub async fn metrics(&self) -> StepMetrics {
        self.shared.stage.lock().await.metrics
    }

    /// Current state of the visual model, if a program was ever started.
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.shared.stage.lock().await.model.as_ref().map(|m| m.snapshot())
    }

    pub async fn last_report(&self) -> Option<RunReport> {
        self.shared.stage.lock().await.last_report.clone()
    }

    pub async fn register_panel(&self, listing: &'static Listing) {
        self.shared.stage.lock().await.code_sync.register_panel(listing);
    }

    pub async fn panels(&self) -> Vec<PanelView> {
        self.shared.stage.lock().await.code_sync.panels()
    }

    /// Inspect the renderer between steps.
    pub async fn with_renderer<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.shared.stage.lock().await.renderer)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.shared.events.subscribe()
    }

    fn halt(&self, stage: &mut Stage<R>) {
        if stage.status.is_active() {
            stage.generation += 1;
            stage.status = PlayerStatus::Stopped;
            info!(at = stage.current, "run stopped");
            self.shared.publish(PlayerEvent::Stopped { at: stage.current });
            // a paused loop is parked on `wake`; let it see the new generation and exit
            self.shared.wake.notify_waiters();
        }
        stage.clear();
    }

    fn fail(&self, stage: &mut Stage<R>, err: Error) {
        fail(&self.shared, stage, err);
    }
}

fn fail<R: Renderer>(shared: &Shared<R>, stage: &mut Stage<R>, err: Error) {
    error!(at = stage.current, error = %err, "run aborted");
    stage.generation += 1;
    stage.status = PlayerStatus::Idle;
    stage.last_error = Some(err.to_string());
    stage.clear();
    shared.publish(PlayerEvent::Failed {
        at: stage.current,
        error: err.to_string(),
    });
}

async fn run<R: Renderer + 'static>(shared: Arc<Shared<R>>, generation: u64) {
    loop {
        let delay = {
            let mut stage = shared.stage.lock().await;
            if stage.generation != generation {
                return;
            }
            match stage.status {
                PlayerStatus::Running => {}
                PlayerStatus::Paused => {
                    let wake = shared.wake.notified();
                    drop(stage);
                    wake.await;
                    continue;
                }
                PlayerStatus::Idle | PlayerStatus::Stopped => return,
            }

            match stage.advance() {
                Ok(Some((index, step, snapshot))) => {
                    debug!(index, kind = ?step.kind, "step applied");
                    shared.publish(PlayerEvent::Step {
                        index,
                        total_steps: stage.program.as_ref().map_or(0, |p| p.len()),
                        elapsed_ms: stage.elapsed_ms(),
                        step,
                        snapshot,
                    });
                    stage.speed_ms
                }
                Ok(None) => {
                    complete(&shared, &mut stage);
                    return;
                }
                Err(err) => {
                    fail(&shared, &mut stage, err);
                    return;
                }
            }
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

fn complete<R: Renderer>(shared: &Shared<R>, stage: &mut Stage<R>) {
    let Some(algorithm) = stage.program.as_ref().map(|p| p.algorithm()) else {
        return;
    };
    let report = stage.report(algorithm);
    info!(
        %algorithm,
        steps = report.steps,
        duration_ms = report.duration_ms,
        comparisons = report.comparisons,
        swaps = report.swaps,
        "run completed"
    );
    stage.status = PlayerStatus::Idle;
    // the last frame stays on screen; only the panels are cleared
    stage.code_sync.clear_all();
    stage.last_report = Some(report.clone());
    shared.publish(PlayerEvent::Completed { report });
}
