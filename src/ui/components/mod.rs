//! Leaf widgets

pub mod button;
pub mod clock;
pub mod label;
pub mod slider;

pub use button::{Button, Command};
pub use clock::{Clock, ClockText, LocalTime, WallClock};
pub use label::Label;
pub use slider::{ReleaseCallback, Slider};
