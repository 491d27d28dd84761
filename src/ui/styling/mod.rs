//! Styling for UI elements
//!
//! Only named colors live here; per-widget colors are set through each
//! widget's `with_colors` builder.

pub mod colors;

pub use colors::{BLACK, BLUE, GRAY, GREEN, LIGHT_GRAY, ORANGE, RED, WHITE, YELLOW};
