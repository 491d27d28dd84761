//! Stateful drawing context over an embedded-graphics draw target
//!
//! Panels driven by this toolkit expose a single "current region" and a
//! current color pair. [`Canvas`] makes that state explicit: every widget draw
//! sets the region and colors first, then emits primitives whose coordinates
//! are relative to the region's top-left corner and clipped to it.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::error;

use crate::error::{GuiError, GuiResult};
use crate::ui::core::{Align, Colors, Window};

/// Spacing between wrapped lines of [`Canvas::paragraph`]
const LINE_SPACING: i32 = 2;

fn display_error<E: fmt::Debug>(e: E) -> GuiError {
    error!("Display error: {:?}", e);
    GuiError::Display
}

/// Drawing context holding the current region, colors and font.
pub struct Canvas<'a, D> {
    target: &'a mut D,
    screen: Window,
    region: Window,
    colors: Colors,
    font: &'static MonoFont<'static>,
}

impl<'a, D> Canvas<'a, D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: fmt::Debug,
{
    /// Wrap a draw target; the initial region is the whole target.
    pub fn new(target: &'a mut D) -> Self {
        let screen = Window::from(target.bounding_box());
        Self {
            target,
            screen,
            region: screen,
            colors: Colors::default(),
            font: &FONT_6X10,
        }
    }

    /// Use a different font for text primitives.
    pub fn with_font(mut self, font: &'static MonoFont<'static>) -> Self {
        self.font = font;
        self
    }

    /// Full window of the underlying target.
    pub fn screen(&self) -> Window {
        self.screen
    }

    pub fn region(&self) -> Window {
        self.region
    }

    pub fn colors(&self) -> Colors {
        self.colors
    }

    pub fn set_region(&mut self, region: Window) {
        self.region = region;
    }

    pub fn set_colors(&mut self, colors: Colors) {
        self.colors = colors;
    }

    pub fn set_foreground(&mut self, color: Rgb565) {
        self.colors.foreground = color;
    }

    pub fn set_background(&mut self, color: Rgb565) {
        self.colors.background = color;
    }

    /// Set region and colors in one step, as every widget draw must.
    pub fn configure(&mut self, region: Window, colors: Colors) {
        self.region = region;
        self.colors = colors;
    }

    /// Fill the current region with the background color.
    pub fn clear(&mut self) -> GuiResult<()> {
        let area = self.region.to_rectangle();
        self.target
            .fill_solid(&area, self.colors.background)
            .map_err(display_error)
    }

    /// Fill a region-relative rectangle with `color`. Empty sizes draw nothing.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgb565) -> GuiResult<()> {
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        let area = self.region.to_rectangle();
        Rectangle::new(Point::new(x, y), Size::new(width as u32, height as u32))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut self.target.cropped(&area))
            .map_err(display_error)
    }

    /// Circle of `radius` around a region-relative center.
    pub fn circle(&mut self, cx: i32, cy: i32, radius: i32, stroke: Rgb565, fill: Rgb565) -> GuiResult<()> {
        let area = self.region.to_rectangle();
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(stroke)
            .stroke_width(1)
            .fill_color(fill)
            .build();
        Circle::with_center(Point::new(cx, cy), (2 * radius).max(0) as u32)
            .into_styled(style)
            .draw(&mut self.target.cropped(&area))
            .map_err(display_error)
    }

    /// One pixel wide line in the foreground color.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> GuiResult<()> {
        let area = self.region.to_rectangle();
        Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(self.colors.foreground, 1))
            .draw(&mut self.target.cropped(&area))
            .map_err(display_error)
    }

    /// Single line of text aligned inside the current region.
    pub fn text(&mut self, halign: Align, valign: Align, text: &str) -> GuiResult<()> {
        let width = self.region.width();
        let height = self.region.height();

        let (x, alignment) = match halign {
            Align::Start => (0, Alignment::Left),
            Align::Center => (width / 2, Alignment::Center),
            Align::End => (width - 1, Alignment::Right),
        };
        let (y, baseline) = match valign {
            Align::Start => (0, Baseline::Top),
            Align::Center => (height / 2, Baseline::Middle),
            Align::End => (height - 1, Baseline::Bottom),
        };

        let character_style = MonoTextStyle::new(self.font, self.colors.foreground);
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(baseline)
            .build();

        let area = self.region.to_rectangle();
        Text::with_text_style(text, Point::new(x, y), character_style, text_style)
            .draw(&mut self.target.cropped(&area))
            .map_err(display_error)?;
        Ok(())
    }

    /// Word-wrapped text starting at the region's top-left corner.
    ///
    /// Lines that do not fit vertically are dropped.
    pub fn paragraph(&mut self, text: &str, padding: i32) -> GuiResult<()> {
        let char_width = (self.font.character_size.width + self.font.character_spacing).max(1) as i32;
        let max_chars = ((self.region.width() - 2 * padding) / char_width).max(1) as usize;
        let line_height = self.font_height() + LINE_SPACING;
        let character_style = MonoTextStyle::new(self.font, self.colors.foreground);
        let area = self.region.to_rectangle();

        let mut y = padding;
        for line in wrap(text, max_chars) {
            if y + line_height > self.region.height() {
                break;
            }
            Text::with_baseline(&line, Point::new(padding, y), character_style, Baseline::Top)
                .draw(&mut self.target.cropped(&area))
                .map_err(display_error)?;
            y += line_height;
        }
        Ok(())
    }

    /// Rendered width of `text` in pixels.
    pub fn text_width(&self, text: &str) -> i32 {
        MonoTextStyle::new(self.font, self.colors.foreground)
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width as i32
    }

    pub fn font_height(&self) -> i32 {
        self.font.character_size.height as i32
    }
}

/// Break `text` into lines of at most `max_chars`, splitting on whitespace
/// and hard-splitting words that are longer than a line.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for line in text.split('\n') {
        let mut current = String::new();
        for word in line.split_whitespace() {
            let mut word = word;
            while word.chars().count() > max_chars {
                if !current.is_empty() {
                    lines.push(core::mem::take(&mut current));
                }
                let split = word
                    .char_indices()
                    .nth(max_chars)
                    .map(|(idx, _)| idx)
                    .unwrap_or(word.len());
                lines.push(String::from(&word[..split]));
                word = &word[split..];
            }

            let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
            if needed > max_chars && !current.is_empty() {
                lines.push(core::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
