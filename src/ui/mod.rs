//! Widget toolkit
//!
//! - [`core`]: windows, directions, alignment, colors and touch events
//! - [`canvas`]: the stateful drawing context every widget draws through
//! - [`components`]: leaf widgets (labels, sliders, clocks)
//! - [`layouts`]: frames and tabbed menus
//! - [`tree`]: the widget arena with drawing, hit-testing and dispatch

pub mod canvas;
pub mod components;
pub mod core;
pub mod layouts;
pub mod styling;
pub mod tree;

pub use canvas::Canvas;
pub use components::{Button, Clock, Label, LocalTime, Slider, WallClock};
pub use self::core::{Align, Colors, Direction, TouchEvent, WidgetId, Window};
pub use layouts::{Frame, HeaderPosition, Menu, PageStyle};
pub use tree::{WidgetClass, WidgetKind, WidgetTree};
