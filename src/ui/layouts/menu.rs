//! Tabbed menu: a header strip of page titles over one active page

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::error::{GuiError, GuiResult};
use crate::ui::canvas::Canvas;
use crate::ui::core::{Align, Colors, Direction, WidgetId, Window};
use crate::ui::layouts::frame::{Frame, partition};
use crate::ui::styling::colors::{BLACK, BLUE, WHITE};

/// Edge of the menu carrying the title strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPosition {
    /// Titles side by side across the top
    #[default]
    Top,
    /// Titles stacked down the left edge
    Left,
}

impl HeaderPosition {
    /// Axis along which the header cells are laid out.
    fn axis(self) -> Direction {
        match self {
            HeaderPosition::Top => Direction::Horizontal,
            HeaderPosition::Left => Direction::Vertical,
        }
    }
}

impl TryFrom<u8> for HeaderPosition {
    type Error = GuiError;

    fn try_from(side: u8) -> Result<Self, Self::Error> {
        match side {
            0 => Ok(HeaderPosition::Top),
            1 => Ok(HeaderPosition::Left),
            other => Err(GuiError::UnsupportedSide(other)),
        }
    }
}

/// Colors of a page's header cell and body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStyle {
    pub title: Colors,
    pub body: Colors,
}

impl Default for PageStyle {
    fn default() -> Self {
        Self {
            title: Colors::new(BLUE, WHITE),
            body: Colors::new(BLACK, WHITE),
        }
    }
}

/// A titled frame shown while its menu tab is selected
pub struct Page {
    pub(crate) title: String,
    pub(crate) title_colors: Colors,
    pub(crate) frame: Frame,
}

impl Page {
    pub(crate) fn new(title: &str, style: PageStyle, direction: Direction) -> Self {
        Self {
            title: String::from(title),
            title_colors: style.title,
            frame: Frame::new(direction).with_colors(style.body.background, style.body.foreground),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_colors(&self) -> Colors {
        self.title_colors
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// Callback invoked after the active page changed
pub type PageChangeCallback = Box<dyn FnMut()>;

/// Tab container with exactly one visible page
///
/// # Examples
/// ```ignore
/// let menu = tree.add_menu(Menu::new(30).on_change(|| info!("page changed")))?;
/// let home = tree.add_page(menu, "Home", PageStyle::default(), Direction::Vertical)?;
/// ```
pub struct Menu {
    title_size: i32,
    position: HeaderPosition,
    colors: Colors,
    pub(crate) pages: Vec<WidgetId>,
    pub(crate) active: usize,
    on_change: Option<PageChangeCallback>,
}

impl Menu {
    /// Menu with a header strip `title_size` pixels thick.
    pub fn new(title_size: u32) -> Self {
        Self {
            title_size: title_size as i32,
            position: HeaderPosition::Top,
            colors: Colors::default(),
            pages: Vec::new(),
            active: 0,
            on_change: None,
        }
    }

    pub fn with_position(mut self, position: HeaderPosition) -> Self {
        self.position = position;
        self
    }

    pub fn on_change(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn position(&self) -> HeaderPosition {
        self.position
    }

    pub fn colors(&self) -> Colors {
        self.colors
    }

    pub fn pages(&self) -> &[WidgetId] {
        &self.pages
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_page(&self) -> Option<WidgetId> {
        self.pages.get(self.active).copied()
    }

    /// The title strip of a menu drawn in `window`.
    pub fn header_window(&self, window: Window) -> Window {
        let size = self.title_size.min(window.extent(self.cross_axis()));
        match self.position {
            HeaderPosition::Top => Window::new(window.left, window.top, window.right, window.top + size),
            HeaderPosition::Left => Window::new(window.left, window.top, window.left + size, window.bottom),
        }
    }

    /// The area left for the active page.
    pub fn content_window(&self, window: Window) -> Window {
        let header = self.header_window(window);
        match self.position {
            HeaderPosition::Top => Window::new(window.left, header.bottom, window.right, window.bottom),
            HeaderPosition::Left => Window::new(header.right, window.top, window.right, window.bottom),
        }
    }

    /// Axis across which the header strip has its thickness.
    fn cross_axis(&self) -> Direction {
        match self.position.axis() {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }

    /// Whether `pos` falls inside the title strip.
    pub fn in_header(&self, pos: Point, window: Window) -> bool {
        match self.position {
            HeaderPosition::Top => pos.y - window.top < self.title_size,
            HeaderPosition::Left => pos.x - window.left < self.title_size,
        }
    }

    /// Page index under a header tap at `pos`, clamped to the page list.
    pub fn page_at(&self, pos: Point, window: Window) -> Option<usize> {
        let count = self.pages.len();
        if count == 0 {
            return None;
        }
        let axis = self.position.axis();
        let extent = i64::from(window.extent(axis));
        if extent <= 0 {
            return Some(0);
        }
        let offset = match axis {
            Direction::Horizontal => pos.x - window.left,
            Direction::Vertical => pos.y - window.top,
        };
        let index = i64::from(offset) * count as i64 / extent;
        Some(index.clamp(0, count as i64 - 1) as usize)
    }

    pub(crate) fn notify_change(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback();
        }
    }

    /// Render the title strip. `titles` holds each page's title and title
    /// colors, in page order.
    pub(crate) fn draw_header<D>(
        &self,
        window: Window,
        titles: &[(&str, Colors)],
        canvas: &mut Canvas<'_, D>,
    ) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let Some(&(_, active_colors)) = titles.get(self.active) else {
            return Ok(());
        };
        let header = self.header_window(window);
        canvas.configure(header, active_colors);
        canvas.clear()?;

        let axis = self.position.axis();
        let weights: Vec<u32> = titles.iter().map(|_| 1).collect();
        let cells = partition(header.origin(axis), header.extent(axis), &weights);

        for (i, ((start, end), &(title, _))) in cells.into_iter().zip(titles).enumerate() {
            let cell = header.slice(axis, start, end);
            canvas.set_region(cell);
            canvas.text(Align::Center, Align::Center, title)?;

            if i == self.active {
                let length = canvas.text_width(title);
                let x = (cell.width() - length) / 2;
                let y = (cell.height() + canvas.font_height()) / 2 + 2;
                canvas.line(x, y, x + length, y)?;
            }
        }
        Ok(())
    }
}
