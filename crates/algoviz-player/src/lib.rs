//! Algoviz Player
//!
//! Plays [`StepProgram`](algoviz_core::StepProgram)s: one step at a time,
//! with a configurable delay, against any [`Renderer`].
//!
//! # Architecture
//!
//! - **Player**: A single tokio task per run; pause, resume, stop and speed
//!   changes take effect at step boundaries
//! - **Renderer**: Draws snapshots and owns highlight state; [`FrameRecorder`]
//!   is the headless implementation
//! - **Code-Sync**: Optional pseudocode panels driven by each step's `code_refs`
//! - **Speed**: `delay_ms = max(50, 550 - 50 * level)` for levels 1 to 10
//!
//! # Usage
//!
//! ```ignore
//! let player = Player::new(FrameRecorder::new(), PlayerConfig::default());
//! let mut events = player.subscribe();
//!
//! let program = sorting::sort(Algorithm::QuickSort, &[5, 3, 8, 1])?;
//! player.register_panel(program.listing()).await;
//! player.start(program).await;
//! ```

mod code_sync;
mod error;
mod player;
mod render;
mod speed;

pub use code_sync::{CodeSync, PanelView};
pub use error::{Error, Result};
pub use player::{Player, PlayerConfig, PlayerEvent, PlayerStatus, Progress, RunReport, StartOutcome};
pub use render::{Frame, FrameRecorder, RecordedFrame, Renderer, Scene};
pub use speed::{clamp_delay, SpeedLevel, MAX_LEVEL, MIN_DELAY_MS, MIN_LEVEL};
