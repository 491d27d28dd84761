//! In-memory `Rgb565` display that remembers which area changed
//!
//! The GUI draws here and the caller pushes the damaged area to the real
//! panel with [`FrameBuffer::flush`] once per tick. Host tests use it as the
//! display and inspect pixels directly.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

/// Inclusive pixel bounds of the changes since the last flush
#[derive(Debug, Clone, Copy)]
struct Damage {
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

impl Damage {
    fn at(x: usize, y: usize) -> Self {
        Self {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    fn include(&mut self, x: usize, y: usize) {
        self.left = self.left.min(x);
        self.top = self.top.min(y);
        self.right = self.right.max(x);
        self.bottom = self.bottom.max(y);
    }

    fn area(&self) -> Rectangle {
        Rectangle::with_corners(
            Point::new(self.left as i32, self.top as i32),
            Point::new(self.right as i32, self.bottom as i32),
        )
    }
}

pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    damage: Option<Damage>,
}

impl FrameBuffer {
    /// Black buffer of `size`.
    pub fn new(size: Size) -> Self {
        let width = size.width as usize;
        let height = size.height as usize;
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width * height],
            damage: None,
        }
    }

    fn coords(&self, point: Point) -> Option<(usize, usize)> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Store `color`; unchanged pixels do not count as damage.
    fn put(&mut self, x: usize, y: usize, color: Rgb565) {
        let slot = &mut self.pixels[y * self.width + x];
        if *slot == color {
            return;
        }
        *slot = color;
        match self.damage.as_mut() {
            Some(damage) => damage.include(x, y),
            None => self.damage = Some(Damage::at(x, y)),
        }
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.coords(point).map(|(x, y)| self.pixels[y * self.width + x])
    }

    /// Smallest rectangle holding every pixel changed since the last flush.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.damage.map(|d| d.area())
    }

    pub fn mark_clean(&mut self) {
        self.damage = None;
    }

    /// Send the damaged area to `display` in one `fill_contiguous` call.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(damage) = self.damage.take() else {
            return Ok(());
        };
        let area = damage.area();
        debug!("Flush {:?}", area);

        let rows = self
            .pixels
            .chunks(self.width)
            .skip(damage.top)
            .take(damage.bottom - damage.top + 1);
        let colors = rows.flat_map(|row| row[damage.left..=damage.right].iter().copied());
        display.fill_contiguous(&area, colors)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some((x, y)) = self.coords(point) {
                self.put(x, y, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        let Some(bottom_right) = clipped.bottom_right() else {
            return Ok(());
        };
        let top_left = clipped.top_left;
        for y in top_left.y..=bottom_right.y {
            for x in top_left.x..=bottom_right.x {
                self.put(x as usize, y as usize, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::PrimitiveStyle;

    #[test]
    fn test_dirty_area_tracks_changed_pixels_only() {
        let mut fb = FrameBuffer::new(Size::new(32, 16));
        assert!(fb.dirty_area().is_none());

        // Repainting the current color is not a change.
        fb.clear(Rgb565::BLACK).unwrap();
        assert!(fb.dirty_area().is_none());

        Rectangle::new(Point::new(4, 2), Size::new(3, 5))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(4, 2), Size::new(3, 5)))
        );
        assert_eq!(fb.pixel(Point::new(4, 2)), Some(Rgb565::RED));
        assert_eq!(fb.pixel(Point::new(3, 2)), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(Point::new(32, 0)), None);
        assert_eq!(fb.pixel(Point::new(-1, 0)), None);
    }

    #[test]
    fn test_flush_copies_dirty_region_and_resets() {
        let mut fb = FrameBuffer::new(Size::new(16, 16));
        let mut hw = FrameBuffer::new(Size::new(16, 16));

        fb.fill_solid(&Rectangle::new(Point::new(2, 3), Size::new(4, 4)), Rgb565::GREEN)
            .unwrap();
        fb.flush(&mut hw).unwrap();

        assert!(fb.dirty_area().is_none());
        assert_eq!(hw.pixel(Point::new(2, 3)), Some(Rgb565::GREEN));
        assert_eq!(hw.pixel(Point::new(5, 6)), Some(Rgb565::GREEN));
        assert_eq!(hw.pixel(Point::new(6, 6)), Some(Rgb565::BLACK));
        assert_eq!(hw.dirty_area(), Some(Rectangle::new(Point::new(2, 3), Size::new(4, 4))));
    }

    #[test]
    fn test_out_of_bounds_fill_is_clipped() {
        let mut fb = FrameBuffer::new(Size::new(8, 8));
        fb.fill_solid(&Rectangle::new(Point::new(-4, -4), Size::new(6, 6)), Rgb565::BLUE)
            .unwrap();
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(Point::new(1, 1)), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(Point::new(2, 2)), Some(Rgb565::BLACK));

        fb.mark_clean();
        fb.fill_solid(&Rectangle::new(Point::new(20, 20), Size::new(4, 4)), Rgb565::RED)
            .unwrap();
        assert!(fb.dirty_area().is_none());
    }
}
