//! Named colors used by the default widget styles
//!
//! All colors are RGB565, matching the 16-bit panels this toolkit targets.
//! To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

pub const BLACK: Rgb565 = Rgb565::BLACK;

pub const WHITE: Rgb565 = Rgb565::WHITE;

pub const RED: Rgb565 = Rgb565::RED;

pub const GREEN: Rgb565 = Rgb565::GREEN;

pub const BLUE: Rgb565 = Rgb565::BLUE;

pub const YELLOW: Rgb565 = Rgb565::YELLOW;

/// Warm orange (255, 165, 0)
pub const ORANGE: Rgb565 = Rgb565::new(255 >> 3, 165 >> 2, 0);

/// Medium gray (128, 128, 128)
pub const GRAY: Rgb565 = Rgb565::new(128 >> 3, 128 >> 2, 128 >> 3);

/// Light gray (211, 211, 211), the idle slider track
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(211 >> 3, 211 >> 2, 211 >> 3);
