//! Bar charts for arrays and rings for graphs.

use std::f64::consts::PI;

use crate::Point;

/// Gap left between neighbouring bars.
const BAR_GAP: f64 = 2.0;

/// Smallest ring radius handed out for crowded graphs.
const MIN_RING_RADIUS: f64 = 40.0;

/// Canvas margins.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 40.0,
            left: 20.0,
        }
    }
}

/// One bar of an array chart, with its label anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: Point,
}

/// Lay out `values` as bars on a `width` x `height` canvas.
///
/// Bar heights are proportional to the largest value; non-positive values
/// get zero height.
pub fn bar_layout(values: &[i64], width: f64, height: f64, margin: Margin) -> Vec<BarRect> {
    if values.is_empty() {
        return Vec::new();
    }
    let slot = (width - margin.left - margin.right) / values.len() as f64;
    let max = values.iter().copied().max().unwrap_or(1).max(1) as f64;
    let usable = height - margin.top - margin.bottom;

    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let h = (value.max(0) as f64 / max) * usable;
            let x = margin.left + i as f64 * slot;
            let y = height - margin.bottom - h;
            BarRect {
                x,
                y,
                width: (slot - BAR_GAP).max(1.0),
                height: h,
                label: Point::new(x + slot / 2.0, y - 5.0),
            }
        })
        .collect()
}

/// Ring radius for `count` nodes: shrinks as the ring fills up.
pub fn ring_radius(count: usize) -> f64 {
    (200.0 - count as f64 * 5.0).min(150.0).max(MIN_RING_RADIUS)
}

/// Place `count` nodes evenly on a ring, node 0 at angle zero.
pub fn ring_layout(count: usize, center: Point, radius: f64) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallest_bar_fills_usable_height() {
        let margin = Margin::default();
        let bars = bar_layout(&[10, 50, 25], 800.0, 400.0, margin);
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].height, 400.0 - margin.top - margin.bottom);
        assert_eq!(bars[1].y, margin.top);
        assert!((bars[0].height * 5.0 - bars[1].height).abs() < 1e-9);
    }

    #[test]
    fn bars_are_left_to_right() {
        let bars = bar_layout(&[1, 2, 3, 4], 800.0, 400.0, Margin::default());
        for pair in bars.windows(2) {
            assert!(pair[0].x < pair[1].x);
            assert!(pair[0].x + pair[0].width < pair[1].x);
        }
    }

    #[test]
    fn empty_array_has_no_bars() {
        assert!(bar_layout(&[], 800.0, 400.0, Margin::default()).is_empty());
    }

    #[test]
    fn ring_radius_shrinks_and_floors() {
        assert_eq!(ring_radius(6), 150.0);
        assert_eq!(ring_radius(20), 100.0);
        assert_eq!(ring_radius(100), MIN_RING_RADIUS);
    }

    #[test]
    fn ring_points_sit_on_the_circle() {
        let center = Point::new(400.0, 250.0);
        let points = ring_layout(6, center, 150.0);
        assert_eq!(points.len(), 6);
        assert!((points[0].x - 550.0).abs() < 1e-9);
        for p in points {
            let r = ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt();
            assert!((r - 150.0).abs() < 1e-9);
        }
    }
}
