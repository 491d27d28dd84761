//! Weighted linear layout container

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;

use crate::ui::core::{Colors, Direction, WidgetId, Window};
use crate::ui::styling::colors::{BLUE, WHITE};

/// Split `length` pixels starting at `origin` into consecutive spans
/// proportional to `weights`.
///
/// Returns `(start, end)` per weight. Spans share their boundaries, their
/// lengths sum to exactly `length` and each length is within one pixel of
/// `length * w / total`. The rounding error is carried forward so the last
/// span always ends at `origin + length`. Returns an empty list when the
/// total weight is zero.
pub fn partition(origin: i32, length: i32, weights: &[u32]) -> Vec<(i32, i32)> {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return Vec::new();
    }
    let length = i64::from(length.max(0));
    let total = total as i64;

    let mut spans = Vec::with_capacity(weights.len());
    let mut cumulative: i64 = 0;
    let mut start = origin;
    for &weight in weights {
        cumulative += i64::from(weight);
        let end = origin + (length * cumulative / total) as i32;
        spans.push((start, end));
        start = end;
    }
    spans
}

/// Container laying out its children along one axis by weight
///
/// Children stretch across the cross axis. A child with weight 2 gets twice
/// the main-axis length of a sibling with weight 1.
///
/// # Examples
/// ```ignore
/// let row = tree.add_frame(Frame::new(Direction::Horizontal))?;
/// tree.pack(row, name_label, 1)?;
/// tree.pack(row, slider, 3)?;
/// ```
pub struct Frame {
    direction: Direction,
    colors: Colors,
    children: Vec<(WidgetId, u32)>,
}

impl Frame {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            colors: Colors::new(BLUE, WHITE),
            children: Vec::new(),
        }
    }

    pub fn with_colors(mut self, background: Rgb565, foreground: Rgb565) -> Self {
        self.colors = Colors::new(background, foreground);
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn colors(&self) -> Colors {
        self.colors
    }

    /// Children with their weights, in packing order.
    pub fn children(&self) -> &[(WidgetId, u32)] {
        &self.children
    }

    pub fn child_ids(&self) -> Vec<WidgetId> {
        self.children.iter().map(|&(id, _)| id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn push(&mut self, child: WidgetId, weight: u32) {
        self.children.push((child, weight));
    }

    pub(crate) fn remove(&mut self, child: WidgetId) {
        self.children.retain(|&(id, _)| id != child);
    }

    /// Sub-windows of `window` for every child, in order.
    ///
    /// Empty when the frame has no children or all weights are zero.
    pub fn layout(&self, window: Window) -> Vec<(WidgetId, Window)> {
        let weights: Vec<u32> = self.children.iter().map(|&(_, w)| w).collect();
        partition(
            window.origin(self.direction),
            window.extent(self.direction),
            &weights,
        )
        .into_iter()
        .zip(self.children.iter())
        .map(|((start, end), &(id, _))| (id, window.slice(self.direction, start, end)))
        .collect()
    }

    /// Child whose span contains the main-axis coordinate `pos`.
    ///
    /// Boundary coordinates belong to the later child; coordinates past the
    /// end resolve to the last child.
    pub fn child_at(&self, pos: i32, window: Window) -> Option<(WidgetId, Window)> {
        let axis = self.direction;
        let spans = self.layout(window);
        let last = spans.last().copied();
        spans
            .into_iter()
            .find(|(_, w)| pos < w.origin(axis) + w.extent(axis))
            .or(last)
    }
}
