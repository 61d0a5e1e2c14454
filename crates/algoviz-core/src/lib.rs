//! Algoviz Core
//!
//! Deterministic, pre-computed step programs for animating classic
//! algorithms and data structures.
//!
//! # Architecture
//!
//! - **Steps**: Atomic units of progress carrying subjects, a highlight, an
//!   optional declarative [`Mutation`], pseudocode line references and metrics
//! - **Models**: Arrays, heaps, search trees, tries, graphs, segment trees and
//!   DP tables, changed only by applying steps
//! - **Sources**: Instrumented algorithms that record a [`StepProgram`]
//! - **Pseudocode**: Built-in listings the steps point into
//!
//! # Usage
//!
//! ```
//! use algoviz_core::{source, Algorithm, Outcome};
//!
//! let program = source::sorting::sort(Algorithm::BubbleSort, &[5, 3, 8, 1]).unwrap();
//! assert_eq!(program.outcome(), &Outcome::Sorted { values: vec![1, 3, 5, 8] });
//!
//! let end = program.replay().unwrap();
//! assert_eq!(end.snapshot(), program.end_state().snapshot());
//! ```

mod catalog;
mod error;
pub mod generate;
pub mod model;
pub mod pseudocode;
pub mod source;
mod step;

pub use catalog::{Algorithm, Bounds, Complexity, Family};
pub use error::{Error, Result};
pub use generate::{Generator, GeneratorConfig};
pub use model::{Snapshot, VisualModel};
pub use pseudocode::Listing;
pub use source::{Outcome, StepProgram};
pub use algoviz_layout::Side;
pub use step::{EdgeState, ElementId, Highlight, Mutation, NodeId, Step, StepKind, StepMetrics};
