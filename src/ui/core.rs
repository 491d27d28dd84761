//! Core UI types shared by widgets, layouts and the touch router

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use slotmap::new_key_type;

use crate::error::GuiError;

new_key_type! {
    /// Stable handle to a widget stored in a [`WidgetTree`](crate::ui::WidgetTree).
    ///
    /// Handles are non-owning: holding one never keeps a widget alive.
    pub struct WidgetId;
}

/// The pixel region a widget is allocated to draw into.
///
/// Sibling windows share their boundary coordinate, so the extent along an
/// axis is `right - left` (or `bottom - top`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Window {
    /// Create a window, normalizing inverted edges to a zero-area window.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right: if right < left { left } else { right },
            bottom: if bottom < top { top } else { bottom },
        }
    }

    /// Window anchored at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width as i32, size.height as i32)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Extent along the layout axis of `direction`.
    pub fn extent(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Horizontal => self.width(),
            Direction::Vertical => self.height(),
        }
    }

    /// First coordinate along the layout axis of `direction`.
    pub fn origin(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Horizontal => self.left,
            Direction::Vertical => self.top,
        }
    }

    /// Sub-window spanning `[start, end]` along `direction` and the full
    /// extent of the cross axis. Coordinates are absolute.
    pub fn slice(&self, direction: Direction, start: i32, end: i32) -> Window {
        match direction {
            Direction::Horizontal => Window::new(start, self.top, end, self.bottom),
            Direction::Vertical => Window::new(self.left, start, self.right, end),
        }
    }

    /// Whether `point` lies inside the window, edges included.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// The embedded-graphics rectangle covering this window.
    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::new(
            self.top_left(),
            Size::new(self.width().max(0) as u32, self.height().max(0) as u32),
        )
    }
}

impl From<Rectangle> for Window {
    fn from(rect: Rectangle) -> Self {
        Window::new(
            rect.top_left.x,
            rect.top_left.y,
            rect.top_left.x + rect.size.width as i32,
            rect.top_left.y + rect.size.height as i32,
        )
    }
}

/// Axis along which a frame lays out its children
///
/// Children are laid out sequentially along the main axis and stretch across
/// the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left to right
    Horizontal,
    /// Top to bottom
    #[default]
    Vertical,
}

impl TryFrom<u8> for Direction {
    type Error = GuiError;

    /// Numeric sides: 0 stacks from the top, 1 from the left.
    fn try_from(side: u8) -> Result<Self, Self::Error> {
        match side {
            0 => Ok(Direction::Vertical),
            1 => Ok(Direction::Horizontal),
            other => Err(GuiError::UnsupportedSide(other)),
        }
    }
}

/// Placement of content along one axis of its window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Left or top
    Start,
    #[default]
    Center,
    /// Right or bottom
    End,
}

/// Background and foreground color pair of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    pub background: Rgb565,
    pub foreground: Rgb565,
}

impl Colors {
    pub const fn new(background: Rgb565, foreground: Rgb565) -> Self {
        Self {
            background,
            foreground,
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self::new(Rgb565::BLACK, Rgb565::WHITE)
    }
}

/// Touch events delivered to a captured widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// First contact of a gesture
    Press(Point),
    /// Contact moved (or persisted) while captured
    Drag(Point),
    /// Confirmed release at the last known position
    Release(Point),
}

impl TouchEvent {
    pub fn position(&self) -> Point {
        match self {
            TouchEvent::Press(p) | TouchEvent::Drag(p) | TouchEvent::Release(p) => *p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_window_is_normalized() {
        let window = Window::new(10, 10, 5, 4);
        assert_eq!(window.width(), 0);
        assert_eq!(window.height(), 0);
    }

    #[test]
    fn test_contains_includes_edges() {
        let window = Window::new(0, 0, 320, 240);
        assert!(window.contains(Point::new(0, 0)));
        assert!(window.contains(Point::new(320, 240)));
        assert!(!window.contains(Point::new(321, 10)));
        assert!(!window.contains(Point::new(-1, 10)));
    }

    #[test]
    fn test_rectangle_conversion() {
        let window = Window::new(10, 20, 110, 70);
        let rect = window.to_rectangle();
        assert_eq!(rect.top_left, Point::new(10, 20));
        assert_eq!(rect.size, Size::new(100, 50));
        assert_eq!(Window::from(rect), window);
    }

    #[test]
    fn test_side_mapping() {
        assert_eq!(Direction::try_from(0).unwrap(), Direction::Vertical);
        assert_eq!(Direction::try_from(1).unwrap(), Direction::Horizontal);
        assert!(matches!(
            Direction::try_from(2),
            Err(GuiError::UnsupportedSide(2))
        ));
    }
}
