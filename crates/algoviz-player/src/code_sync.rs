//! Pseudocode panels highlighted in lockstep with the player.

use std::collections::{BTreeMap, BTreeSet};

use algoviz_core::{Listing, Step};
use serde::Serialize;

#[derive(Debug, Clone)]
struct Panel {
    listing: &'static Listing,
    highlighted: BTreeSet<u32>,
    focus: Option<u32>,
}

/// Read-only view of a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub id: &'static str,
    pub title: &'static str,
    pub lines: &'static [&'static str],
    pub highlighted: Vec<u32>,
    /// The line scrolled into view.
    pub focus: Option<u32>,
}

/// Highlights pseudocode lines named by each step's `code_refs`.
///
/// Purely a side effect of stepping; with no panels registered it does nothing.
#[derive(Debug, Clone, Default)]
pub struct CodeSync {
    panels: BTreeMap<&'static str, Panel>,
}

impl CodeSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `listing` as a panel keyed by its id. Re-registering clears it.
    pub fn register_panel(&mut self, listing: &'static Listing) {
        self.panels.insert(
            listing.id,
            Panel {
                listing,
                highlighted: BTreeSet::new(),
                focus: None,
            },
        );
    }

    pub fn unregister_panel(&mut self, id: &str) -> bool {
        self.panels.remove(id).is_some()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.panels.contains_key(id)
    }

    /// Mirror `step` onto every panel it references.
    pub fn apply(&mut self, step: &Step) {
        for (id, lines) in &step.code_refs {
            let Some(panel) = self.panels.get_mut(id.as_str()) else {
                continue;
            };
            panel.highlighted.clear();
            panel.focus = None;
            for &line in lines {
                // lines outside the listing are ignored
                if panel.listing.line(line).is_none() {
                    continue;
                }
                panel.highlighted.insert(line);
                panel.focus.get_or_insert(line);
            }
        }
    }

    pub fn clear_all(&mut self) {
        for panel in self.panels.values_mut() {
            panel.highlighted.clear();
            panel.focus = None;
        }
    }

    /// Total highlighted lines across panels.
    pub fn highlighted(&self) -> usize {
        self.panels.values().map(|p| p.highlighted.len()).sum()
    }

    pub fn panel(&self, id: &str) -> Option<PanelView> {
        self.panels.get(id).map(view)
    }

    pub fn panels(&self) -> Vec<PanelView> {
        self.panels.values().map(view).collect()
    }
}

fn view(panel: &Panel) -> PanelView {
    PanelView {
        id: panel.listing.id,
        title: panel.listing.title,
        lines: panel.listing.lines,
        highlighted: panel.highlighted.iter().copied().collect(),
        focus: panel.focus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_core::pseudocode::{BUBBLE_SORT, DIJKSTRA};
    use algoviz_core::{Highlight, StepKind};

    fn step(panel: &str, lines: &[u32]) -> Step {
        Step::new(StepKind::Compare, Highlight::Comparing).lines(panel, lines)
    }

    #[test]
    fn highlights_exactly_the_referenced_lines() {
        let mut sync = CodeSync::new();
        sync.register_panel(&BUBBLE_SORT);

        sync.apply(&step("bubble_sort", &[4, 5]));
        let panel = sync.panel("bubble_sort").unwrap();
        assert_eq!(panel.highlighted, vec![4, 5]);
        assert_eq!(panel.focus, Some(4));

        sync.apply(&step("bubble_sort", &[6]));
        assert_eq!(sync.panel("bubble_sort").unwrap().highlighted, vec![6]);
    }

    #[test]
    fn out_of_range_lines_are_ignored() {
        let mut sync = CodeSync::new();
        sync.register_panel(&BUBBLE_SORT);
        sync.apply(&step("bubble_sort", &[0, 99, 2]));
        let panel = sync.panel("bubble_sort").unwrap();
        assert_eq!(panel.highlighted, vec![2]);
        assert_eq!(panel.focus, Some(2));
    }

    #[test]
    fn other_panels_are_untouched() {
        let mut sync = CodeSync::new();
        sync.register_panel(&BUBBLE_SORT);
        sync.register_panel(&DIJKSTRA);
        sync.apply(&step("dijkstra", &[3]));
        sync.apply(&step("bubble_sort", &[1]));
        assert_eq!(sync.panel("dijkstra").unwrap().highlighted, vec![3]);
        assert_eq!(sync.highlighted(), 2);

        sync.clear_all();
        assert_eq!(sync.highlighted(), 0);
    }

    #[test]
    fn unregistered_panels_have_no_effect() {
        let mut sync = CodeSync::new();
        sync.apply(&step("bubble_sort", &[1]));
        assert!(sync.panels().is_empty());
        assert!(!sync.unregister_panel("bubble_sort"));
    }
}
