#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod framebuffer;
pub mod scheduler;
pub mod screen;
pub mod touch;
pub mod ui;
pub mod value;

#[cfg(test)]
mod test_support;

pub use config::GuiConfig;
pub use error::{ErrorKind, GuiError, GuiResult};
pub use framebuffer::FrameBuffer;
pub use screen::Screen;
pub use touch::{Calibration, Orientation, Panel, RawTouch, TouchRouter};
pub use ui::WidgetTree;
pub use value::{Value, ValueStore};
