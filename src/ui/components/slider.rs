//! Slider bound to an integer reactive value

use alloc::boxed::Box;
use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::error::GuiResult;
use crate::ui::canvas::Canvas;
use crate::ui::core::{Colors, Direction, Window};
use crate::ui::styling::colors::{BLACK, BLUE, LIGHT_GRAY};
use crate::value::Value;

/// Callback invoked with the final value when the finger lifts
pub type ReleaseCallback = Box<dyn FnMut(i32)>;

/// Slider mapping touch positions onto an integer range
///
/// Horizontal sliders increase left to right, vertical sliders bottom to top.
/// A margin at both ends of the track is excluded from the active travel, so
/// touching anywhere inside the margin pins the value to `min` or `max`.
///
/// # Examples
/// ```ignore
/// let brightness = tree.create_value(100i32);
/// let slider = Slider::new(brightness)
///     .with_range(1, 100)
///     .on_release(|level| backlight.set(level));
/// ```
pub struct Slider {
    value: Value<i32>,
    direction: Direction,
    min: i32,
    max: i32,
    margin: i32,
    bar_width: i32,
    handle_radius: i32,
    colors: Colors,
    active_color: Rgb565,
    on_release: Option<ReleaseCallback>,
}

impl Slider {
    pub fn new(value: Value<i32>) -> Self {
        Self {
            value,
            direction: Direction::Horizontal,
            min: 0,
            max: 100,
            margin: 15,
            bar_width: 4,
            handle_radius: 10,
            colors: Colors::new(BLACK, LIGHT_GRAY),
            active_color: BLUE,
            on_release: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the value range. Bounds are reordered if given backwards.
    pub fn with_range(mut self, min: i32, max: i32) -> Self {
        self.min = min.min(max);
        self.max = max.max(min);
        self
    }

    /// Margin in pixels excluded from both ends of the travel.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin as i32;
        self
    }

    pub fn with_bar_width(mut self, width: u32) -> Self {
        self.bar_width = width as i32;
        self
    }

    pub fn with_handle_radius(mut self, radius: u32) -> Self {
        self.handle_radius = radius as i32;
        self
    }

    /// Track background and idle foreground colors.
    pub fn with_colors(mut self, background: Rgb565, foreground: Rgb565) -> Self {
        self.colors = Colors::new(background, foreground);
        self
    }

    /// Color of the traveled bar and of the handle while above `min`.
    pub fn with_active_color(mut self, color: Rgb565) -> Self {
        self.active_color = color;
        self
    }

    pub fn on_release(mut self, callback: impl FnMut(i32) + 'static) -> Self {
        self.on_release = Some(Box::new(callback));
        self
    }

    pub fn value(&self) -> Value<i32> {
        self.value
    }

    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    pub fn colors(&self) -> Colors {
        self.colors
    }

    /// Length of the active travel inside `window`.
    fn travel(&self, window: Window) -> i32 {
        window.extent(self.direction) - 2 * self.margin
    }

    /// Value selected by a touch at `pos` on a slider drawn in `window`.
    ///
    /// The position is clamped onto the travel before scaling, so the result
    /// is always within `[min, max]`.
    pub fn value_at(&self, pos: Point, window: Window) -> i32 {
        let travel = self.travel(window);
        if travel <= 0 {
            return self.min;
        }

        let offset = match self.direction {
            Direction::Horizontal => pos.x - window.left - self.margin,
            Direction::Vertical => travel - (pos.y - window.top - self.margin),
        }
        .clamp(0, travel);

        let span = i64::from(self.max) - i64::from(self.min);
        self.min + (i64::from(offset) * span / i64::from(travel)) as i32
    }

    /// Pixels of travel covered by `value` for a track of `length`.
    fn traveled(&self, value: i32, length: i32) -> i32 {
        let span = i64::from(self.max) - i64::from(self.min);
        if span <= 0 || length <= 0 {
            return 0;
        }
        let value = i64::from(value.clamp(self.min, self.max) - self.min);
        (value * i64::from(length) / span) as i32
    }

    pub(crate) fn fire_release(&mut self, value: i32) {
        if let Some(callback) = self.on_release.as_mut() {
            callback(value);
        }
    }

    /// Render the track and handle for `value` into the configured region.
    pub(crate) fn draw<D>(&self, value: i32, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let region = canvas.region();
        let width = region.width();
        let height = region.height();
        let length = self.travel(region).max(0);
        let traveled = self.traveled(value, length);

        let (stroke, fill) = if value > self.min {
            (self.active_color, self.active_color)
        } else {
            (self.colors.foreground, self.colors.background)
        };

        canvas.clear()?;
        match self.direction {
            Direction::Horizontal => {
                let y = (height - self.bar_width) / 2;
                canvas.fill_rect(self.margin, y, traveled, self.bar_width, self.active_color)?;
                canvas.fill_rect(
                    self.margin + traveled,
                    y,
                    length - traveled,
                    self.bar_width,
                    self.colors.foreground,
                )?;
                canvas.circle(self.margin + traveled, height / 2, self.handle_radius, stroke, fill)
            }
            Direction::Vertical => {
                let x = (width - self.bar_width) / 2;
                let remaining = length - traveled;
                canvas.fill_rect(x, self.margin, self.bar_width, remaining, self.colors.foreground)?;
                canvas.fill_rect(
                    x,
                    self.margin + remaining,
                    self.bar_width,
                    traveled,
                    self.active_color,
                )?;
                canvas.circle(width / 2, self.margin + remaining, self.handle_radius, stroke, fill)
            }
        }
    }
}
