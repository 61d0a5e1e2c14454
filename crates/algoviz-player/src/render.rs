//! The renderer contract and a headless renderer that records frames.

use std::collections::BTreeMap;

use algoviz_core::{ElementId, Highlight, Snapshot, Step, StepKind};
use algoviz_layout::{bar_layout, ring_layout, ring_radius, BarRect, LayoutConfig, Margin, Point, TreeLayout};
use serde::Serialize;

use crate::error::{Error, Result};

/// What to emphasise while drawing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Index of the step being shown; `None` for the baseline.
    pub step: Option<usize>,
    pub kind: Option<StepKind>,
    pub subjects: Vec<ElementId>,
    pub highlight: Highlight,
    pub narration: String,
}

impl Frame {
    /// A frame with no emphasis.
    pub fn idle() -> Self {
        Self {
            step: None,
            kind: None,
            subjects: Vec::new(),
            highlight: Highlight::None,
            narration: String::new(),
        }
    }

    pub fn for_step(index: usize, step: &Step) -> Self {
        Self {
            step: Some(index),
            kind: Some(step.kind),
            subjects: step.subjects.clone(),
            highlight: step.highlight,
            narration: step.narration.clone(),
        }
    }
}

/// Draws visual models.
///
/// Highlights follow clear-all-then-apply-new: every `draw` drops whatever
/// the previous frame emphasised before applying the new frame's highlight.
pub trait Renderer: Send {
    fn draw(&mut self, snapshot: &Snapshot, frame: &Frame) -> Result<()>;

    fn clear_highlights(&mut self);

    /// Recompute positions, e.g. after a resize or a structural change.
    fn reflow(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Number of currently highlighted elements.
    fn highlighted(&self) -> usize;
}

/// Positions computed for a snapshot.
#[derive(Debug, Clone)]
pub enum Scene {
    Bars(Vec<BarRect>),
    Tree(TreeLayout),
    Ring(Vec<Point>),
    Grid { rows: usize, cols: usize },
}

impl Scene {
    /// Lay out `snapshot` on a `width` x `height` canvas.
    pub fn layout(snapshot: &Snapshot, width: f64, height: f64) -> Result<Self> {
        if let Some(hierarchy) = snapshot.hierarchy() {
            return Ok(Scene::Tree(hierarchy.layout(&LayoutConfig::default())?));
        }
        match snapshot {
            Snapshot::Array { values, .. } => Ok(Scene::Bars(bar_layout(values, width, height, Margin::default()))),
            Snapshot::Graph { nodes, .. } => {
                let center = Point::new(width / 2.0, height / 2.0);
                let radius = ring_radius(nodes.len()).min(width.min(height) / 2.0);
                Ok(Scene::Ring(ring_layout(nodes.len(), center, radius)))
            }
            Snapshot::Grid { cells, .. } => Ok(Scene::Grid {
                rows: cells.len(),
                cols: cells.first().map_or(0, Vec::len),
            }),
            Snapshot::Tree { .. } => Err(Error::Render("tree snapshot is not a single hierarchy".into())),
        }
    }

    /// Number of positioned elements.
    pub fn len(&self) -> usize {
        match self {
            Scene::Bars(bars) => bars.len(),
            Scene::Tree(layout) => layout.len(),
            Scene::Ring(points) => points.len(),
            Scene::Grid { rows, cols } => rows * cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A frame as seen by [`FrameRecorder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedFrame {
    pub frame: Frame,
    pub snapshot: Snapshot,
}

/// Headless renderer that keeps every frame of the current run.
///
/// A baseline frame (no step) starts a new history, so a long-lived recorder
/// holds at most one run's frames.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    frames: Vec<RecordedFrame>,
    highlights: BTreeMap<ElementId, Highlight>,
    scene: Option<Scene>,
    reflows: usize,
    fail_at: Option<usize>,
    fail_baseline: bool,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose draw of step `index` fails.
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Make every baseline draw fail.
    pub fn fail_on_baseline(&mut self) {
        self.fail_baseline = true;
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    /// Current highlight of `element`.
    pub fn highlight_of(&self, element: &ElementId) -> Option<Highlight> {
        self.highlights.get(element).copied()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn reflows(&self) -> usize {
        self.reflows
    }
}

impl Renderer for FrameRecorder {
    fn draw(&mut self, snapshot: &Snapshot, frame: &Frame) -> Result<()> {
        match (frame.step, self.fail_at) {
            (Some(step), Some(fail)) if step == fail => {
                return Err(Error::Render(format!("cannot draw step {}", step)));
            }
            (None, _) if self.fail_baseline => {
                return Err(Error::Render("cannot draw the baseline".into()));
            }
            _ => {}
        }
        self.highlights.clear();
        if frame.highlight != Highlight::None {
            for subject in &frame.subjects {
                self.highlights.insert(*subject, frame.highlight);
            }
        }
        if frame.step.is_none() {
            self.frames.clear();
        }
        self.frames.push(RecordedFrame {
            frame: frame.clone(),
            snapshot: snapshot.clone(),
        });
        Ok(())
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    fn reflow(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.scene = Some(Scene::layout(snapshot, 800.0, 400.0)?);
        self.reflows += 1;
        Ok(())
    }

    fn highlighted(&self) -> usize {
        self.highlights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_core::model::{ArrayModel, BstModel, DpTableModel, GraphModel};
    use algoviz_core::VisualModel;

    #[test]
    fn draw_replaces_previous_highlights() {
        let snapshot = ArrayModel::new(vec![3, 1, 2]).snapshot();
        let mut renderer = FrameRecorder::new();

        let compare = Step::new(StepKind::Compare, Highlight::Comparing).indices([0, 1]);
        renderer.draw(&snapshot, &Frame::for_step(0, &compare)).unwrap();
        assert_eq!(renderer.highlighted(), 2);

        let settle = Step::new(StepKind::Conclude, Highlight::Sorted).indices([1, 2]);
        renderer.draw(&snapshot, &Frame::for_step(1, &settle)).unwrap();
        assert_eq!(renderer.highlighted(), 2);
        assert_eq!(renderer.highlight_of(&ElementId::Index(0)), None);
        assert_eq!(renderer.highlight_of(&ElementId::Index(1)), Some(Highlight::Sorted));

        renderer.clear_highlights();
        assert_eq!(renderer.highlighted(), 0);
        assert_eq!(renderer.frames().len(), 2);
    }

    #[test]
    fn idle_frames_highlight_nothing() {
        let snapshot = ArrayModel::new(vec![1]).snapshot();
        let mut renderer = FrameRecorder::new();
        renderer.draw(&snapshot, &Frame::idle()).unwrap();
        assert_eq!(renderer.highlighted(), 0);
    }

    #[test]
    fn scenes_for_every_snapshot_kind() {
        let bars = Scene::layout(&ArrayModel::new(vec![4, 2, 7]).snapshot(), 800.0, 400.0).unwrap();
        assert!(matches!(bars, Scene::Bars(ref b) if b.len() == 3));

        let tree = BstModel::from_values(&[5, 3, 8, 1]).unwrap();
        let scene = Scene::layout(&tree.snapshot(), 800.0, 400.0).unwrap();
        assert!(matches!(scene, Scene::Tree(ref t) if t.len() == 4));

        let ring = Scene::layout(&GraphModel::sample_weighted().snapshot(), 800.0, 400.0).unwrap();
        assert_eq!(ring.len(), 6);

        let grid = Scene::layout(&DpTableModel::lcs("AB", "ABC").snapshot(), 800.0, 400.0).unwrap();
        assert!(matches!(grid, Scene::Grid { rows: 3, cols: 4 }));
    }

    #[test]
    fn reflow_is_independent_of_drawing() {
        let mut renderer = FrameRecorder::new();
        let snapshot = BstModel::from_values(&[2, 1, 3]).unwrap().snapshot();
        renderer.reflow(&snapshot).unwrap();
        renderer.reflow(&snapshot).unwrap();
        assert_eq!(renderer.reflows(), 2);
        assert!(renderer.frames().is_empty());
        assert_eq!(renderer.scene().map(Scene::len), Some(3));
    }

    #[test]
    fn failing_recorder_fails_only_its_step() {
        let snapshot = ArrayModel::new(vec![1, 2]).snapshot();
        let step = Step::new(StepKind::Compare, Highlight::Comparing).indices([0, 1]);
        let mut renderer = FrameRecorder::failing_at(1);
        assert!(renderer.draw(&snapshot, &Frame::idle()).is_ok());
        assert!(renderer.draw(&snapshot, &Frame::for_step(0, &step)).is_ok());
        assert!(matches!(renderer.draw(&snapshot, &Frame::for_step(1, &step)), Err(Error::Render(_))));
    }

    #[test]
    fn baseline_frame_starts_a_new_history() {
        let snapshot = ArrayModel::new(vec![2, 1]).snapshot();
        let step = Step::new(StepKind::Compare, Highlight::Comparing).indices([0, 1]);
        let mut renderer = FrameRecorder::new();
        for _ in 0..3 {
            renderer.draw(&snapshot, &Frame::idle()).unwrap();
            renderer.draw(&snapshot, &Frame::for_step(0, &step)).unwrap();
            renderer.draw(&snapshot, &Frame::for_step(1, &step)).unwrap();
        }
        assert_eq!(renderer.frames().len(), 3);
        assert_eq!(renderer.frames()[0].frame.step, None);
    }
}
