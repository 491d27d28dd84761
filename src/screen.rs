//! The touch session: display, panel, widget tree, router and scheduler
//!
//! [`Screen::poll`] is the single yield point of the UI. Each call samples
//! the touch panel if due, refreshes due clocks and reports when it wants to
//! be polled again. Errors abort the current cycle, are shown full-screen for
//! the configured hold time and the tree is redrawn afterwards.

use alloc::format;
use core::any::Any;
use core::fmt;

use embassy_time::{Duration, Instant};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::config::GuiConfig;
use crate::error::{GuiError, GuiResult};
use crate::scheduler::{Scheduler, Task};
use crate::touch::{Panel, TouchRouter};
use crate::ui::canvas::Canvas;
use crate::ui::core::{Colors, WidgetId, Window};
use crate::ui::styling::colors::{BLACK, RED};
use crate::ui::tree::WidgetTree;
use crate::value::Value;

/// Padding around the full-screen error text
const ERROR_PADDING: i32 = 4;

pub struct Screen<D, P> {
    display: D,
    panel: P,
    tree: WidgetTree,
    router: TouchRouter,
    scheduler: Scheduler,
    config: GuiConfig,
    size: Size,
    backlight: u8,
    now: Instant,
    error_until: Option<Instant>,
}

impl<D, P> Screen<D, P>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: fmt::Debug,
    P: Panel,
{
    /// Screen with default settings and the panel's current orientation.
    pub fn new(display: D, panel: P, tree: WidgetTree) -> Self {
        let config = GuiConfig {
            orientation: panel.orientation(),
            ..GuiConfig::default()
        };
        Self::with_config(display, panel, tree, config)
    }

    pub fn with_config(display: D, mut panel: P, tree: WidgetTree, config: GuiConfig) -> Self {
        let size = display.bounding_box().size;
        let backlight = config.backlight.min(100);
        panel.set_backlight(backlight);

        let start = Instant::from_ticks(0);
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::SampleTouch, config.sample_period(), start);

        info!(
            "Screen {}x{} ready, sampling every {} ms",
            size.width, size.height, config.sample_period_ms
        );
        Self {
            display,
            panel,
            tree,
            router: TouchRouter::new(),
            scheduler,
            config,
            size,
            backlight,
            now: start,
            error_until: None,
        }
    }

    /// Window covering the whole display.
    pub fn window(&self) -> Window {
        Window::from_size(self.size)
    }

    /// Draw the root widget into the full screen.
    pub fn draw(&mut self) -> GuiResult<()> {
        let window = self.window();
        let mut canvas = Canvas::new(&mut self.display);
        self.tree.draw_root(window, &mut canvas)?;
        self.schedule_refreshes();
        Ok(())
    }

    /// Clear the display and draw the whole tree again.
    pub fn redraw_all(&mut self) -> GuiResult<()> {
        {
            let mut canvas = Canvas::new(&mut self.display);
            canvas.configure(Window::from_size(self.size), Colors::default());
            canvas.clear()?;
        }
        self.draw()
    }

    /// Set a reactive value and redraw its visible dependents.
    pub fn set_value<T: Any + fmt::Display>(&mut self, handle: Value<T>, value: T) -> GuiResult<()> {
        let mut canvas = Canvas::new(&mut self.display);
        self.tree.set_value(handle, value, &mut canvas)
    }

    /// Mutate a reactive value in place and redraw its visible dependents.
    pub fn update_value<T: Any, F: FnOnce(&mut T)>(&mut self, handle: Value<T>, f: F) -> GuiResult<()> {
        let mut canvas = Canvas::new(&mut self.display);
        self.tree.update_value(handle, f, &mut canvas)
    }

    /// Select a menu page as if its title had been tapped.
    pub fn select_page(&mut self, menu: WidgetId, index: usize) -> GuiResult<bool> {
        let mut canvas = Canvas::new(&mut self.display);
        let changed = self.tree.select_page(menu, index, &mut canvas)?;
        self.schedule_refreshes();
        Ok(changed)
    }

    /// Set the backlight level in percent, clamped to 100.
    pub fn set_backlight(&mut self, level: u8) {
        self.backlight = level.min(100);
        self.panel.set_backlight(self.backlight);
    }

    pub fn backlight(&self) -> u8 {
        self.backlight
    }

    /// Run every task due at `now` and return the next wake-up time.
    ///
    /// While an error message is on screen nothing else runs; once its hold
    /// time has passed the tree is redrawn and touch handling resumes with a
    /// fresh gesture.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        self.now = now;

        if let Some(until) = self.error_until {
            if now < until {
                return Some(until);
            }
            self.error_until = None;
            self.router.reset();
            info!("Resuming after error");
            if let Err(e) = self.redraw_all() {
                self.report(e);
                return self.error_until;
            }
        }

        for task in self.scheduler.pop_due(now) {
            let result = match task {
                Task::SampleTouch => self.sample_touch(),
                Task::Refresh(id) => self.refresh_clock(id),
            };
            if let Err(e) = result {
                self.report(e);
                return self.error_until;
            }
        }
        self.schedule_refreshes();
        self.scheduler.next_due()
    }

    /// Read the panel once and deliver the resulting touch event, if any.
    pub fn sample_touch(&mut self) -> GuiResult<()> {
        let raw = self.panel.sample_touch();
        let sample = self
            .config
            .calibration
            .map(raw, self.config.orientation, self.size);

        let screen = self.window();
        let tree = &self.tree;
        let Some(dispatch) = self.router.step(sample, |pos| tree.hit_test_root(pos, screen))? else {
            return Ok(());
        };

        let mut canvas = Canvas::new(&mut self.display);
        self.tree
            .dispatch(dispatch.target, dispatch.event, dispatch.window, &mut canvas)
    }

    fn refresh_clock(&mut self, id: WidgetId) -> GuiResult<()> {
        let mut canvas = Canvas::new(&mut self.display);
        if !self.tree.refresh(id, &mut canvas)? {
            self.scheduler.cancel(Task::Refresh(id));
        }
        Ok(())
    }

    /// Schedule clocks that were activated by recent draws.
    fn schedule_refreshes(&mut self) {
        for (id, period) in self.tree.take_refresh_requests() {
            self.scheduler
                .schedule(Task::Refresh(id), period, self.now + period);
        }
    }

    /// Abort the current cycle and show `err` until the hold time elapses.
    pub fn report(&mut self, err: GuiError) {
        error!("GUI error ({:?}): {}", err.kind(), err);
        self.router.reset();
        self.error_until = Some(self.now + self.config.error_hold());

        let text = format!("{}", err);
        let mut canvas = Canvas::new(&mut self.display);
        canvas.configure(Window::from_size(self.size), Colors::new(BLACK, RED));
        if let Err(e) = canvas.clear().and_then(|_| canvas.paragraph(&text, ERROR_PADDING)) {
            error!("Could not show error: {}", e);
        }
    }

    pub fn is_showing_error(&self) -> bool {
        self.error_until.is_some()
    }

    /// Draw once, then poll forever, sleeping between wake-ups.
    ///
    /// `clock` returns the current time of the platform's monotonic timer.
    pub fn run<Dl, C>(&mut self, mut delay: Dl, mut clock: C) -> !
    where
        Dl: DelayNs,
        C: FnMut() -> Instant,
    {
        info!("Starting GUI main loop");
        self.now = clock();
        if let Err(e) = self.draw() {
            self.report(e);
        }

        loop {
            let now = clock();
            let wait = match self.poll(now) {
                Some(next) => next.saturating_duration_since(now),
                None => self.config.sample_period(),
            };
            if wait > Duration::from_ticks(0) {
                delay.delay_us(wait.as_micros().min(u64::from(u32::MAX)) as u32);
            }
        }
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn router(&self) -> &TouchRouter {
        &self.router
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use crate::test_support::{FixedClock, ScriptedPanel};
    use crate::touch::RouterState;
    use crate::ui::components::{Clock, Label, Slider};
    use crate::ui::core::Direction;
    use crate::ui::layouts::{Frame, Menu, PageStyle};

    const SIZE: Size = Size::new(320, 240);

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn screen(tree: WidgetTree, panel: ScriptedPanel) -> Screen<FrameBuffer, ScriptedPanel> {
        Screen::new(FrameBuffer::new(SIZE), panel, tree)
    }

    /// Poll once per sample period for `samples` periods starting at `start_ms`.
    fn run_samples(screen: &mut Screen<FrameBuffer, ScriptedPanel>, start_ms: u64, samples: u64) {
        for i in 0..samples {
            screen.poll(at(start_ms + i * 50));
        }
    }

    #[test]
    fn test_tap_on_title_switches_page() {
        let mut tree = WidgetTree::new();
        let menu = tree.add_menu(Menu::new(30));
        for title in ["A", "B", "C"] {
            let page = tree
                .add_page(menu, title, PageStyle::default(), Direction::Vertical)
                .unwrap();
            let label = tree.add_text(title).unwrap();
            tree.pack(page, label, 1).unwrap();
        }
        tree.set_root(menu).unwrap();

        let mut panel = ScriptedPanel::new(SIZE);
        panel.touch(Point::new(170, 10));
        panel.release();
        panel.release();

        let mut screen = screen(tree, panel);
        screen.draw().unwrap();
        run_samples(&mut screen, 0, 3);

        let tree = screen.tree();
        assert_eq!(tree.active_page(menu).unwrap(), tree.page_by_title(menu, "B").unwrap());
        assert_eq!(screen.router().state(), RouterState::Idle);
        assert!(!screen.is_showing_error());
    }

    #[test]
    fn test_drag_moves_slider_and_release_reports_value() {
        use alloc::rc::Rc;
        use core::cell::Cell;

        let released = Rc::new(Cell::new(0));
        let sink = released.clone();
        let mut tree = WidgetTree::new();
        let level = tree.create_value(0i32);
        let slider = tree
            .add_slider(Slider::new(level).on_release(move |v| sink.set(v)))
            .unwrap();
        let label = tree.add_label(Label::new(level).with_template("{}%")).unwrap();
        let root = tree.add_frame(Frame::new(Direction::Vertical));
        tree.pack(root, slider, 1).unwrap();
        tree.pack(root, label, 1).unwrap();
        tree.set_root(root).unwrap();

        // Travel spans x = 15..305 on a 320 px wide slider.
        let mut panel = ScriptedPanel::new(SIZE);
        panel.touch(Point::new(15, 60));
        panel.touch(Point::new(160, 60));
        panel.release();
        panel.touch(Point::new(319, 60));
        panel.release();
        panel.release();

        let mut screen = screen(tree, panel);
        screen.draw().unwrap();
        run_samples(&mut screen, 0, 2);
        assert_eq!(*screen.tree().value(level).unwrap(), 50);

        run_samples(&mut screen, 100, 4);
        assert_eq!(*screen.tree().value(level).unwrap(), 100);
        assert_eq!(released.get(), 100);
    }

    #[test]
    fn test_error_is_held_then_tree_redrawn() {
        let mut tree = WidgetTree::new();
        let label = tree.add_text("ok").unwrap();
        tree.set_root(label).unwrap();

        let mut panel = ScriptedPanel::new(SIZE);
        panel.touch(Point::new(10, 10));

        let mut screen = screen(tree, panel);
        screen.draw().unwrap();
        screen.poll(at(0));
        assert_eq!(screen.router().state(), RouterState::Captured);

        screen.report(GuiError::Display);
        assert!(screen.is_showing_error());
        assert_eq!(screen.router().state(), RouterState::Idle);

        let samples = screen.panel().samples();
        assert_eq!(screen.poll(at(1000)), Some(at(3000)));
        assert_eq!(screen.panel().samples(), samples);

        let draws = screen.tree().draw_count(label);
        screen.poll(at(3000));
        assert!(!screen.is_showing_error());
        assert_eq!(screen.tree().draw_count(label), draws + 1);
    }

    #[test]
    fn test_failed_page_switch_keeps_previous_page() {
        use alloc::rc::Rc;
        use core::cell::Cell;

        let changes = Rc::new(Cell::new(0u32));
        let counter = changes.clone();
        let mut tree = WidgetTree::new();
        let menu = tree.add_menu(Menu::new(30).on_change(move || counter.set(counter.get() + 1)));
        let a = tree
            .add_page(menu, "A", PageStyle::default(), Direction::Vertical)
            .unwrap();
        let label = tree.add_text("A").unwrap();
        tree.pack(a, label, 1).unwrap();
        let b = tree
            .add_page(menu, "B", PageStyle::default(), Direction::Vertical)
            .unwrap();
        // A menu without pages cannot be drawn.
        let broken = tree.add_menu(Menu::new(30));
        tree.pack(b, broken, 1).unwrap();
        tree.set_root(menu).unwrap();

        let mut panel = ScriptedPanel::new(SIZE);
        panel.touch(Point::new(250, 10));
        panel.release();
        panel.release();

        let mut screen = screen(tree, panel);
        screen.draw().unwrap();
        run_samples(&mut screen, 0, 3);

        assert!(screen.is_showing_error());
        assert_eq!(screen.tree().active_page(menu).unwrap(), a);
        assert!(screen.tree().is_visible(a));
        assert!(!screen.tree().is_visible(b));
        assert_eq!(changes.get(), 0);

        screen.poll(at(4000));
        assert!(!screen.is_showing_error());
        assert_eq!(screen.tree().active_page(menu).unwrap(), a);
        assert!(screen.tree().is_visible(label));
    }

    #[test]
    fn test_routing_error_is_reported() {
        let mut tree = WidgetTree::new();
        let menu = tree.add_menu(Menu::new(30));
        tree.set_root(menu).unwrap();

        let mut panel = ScriptedPanel::new(SIZE);
        panel.touch(Point::new(10, 100));

        let mut screen = screen(tree, panel);
        assert_eq!(screen.poll(at(0)), Some(at(3000)));
        assert!(screen.is_showing_error());
        // Error text is drawn in red.
        assert!(screen.display().dirty_area().is_some());
    }

    #[test]
    fn test_clock_refresh_stops_when_hidden() {
        let mut tree = WidgetTree::new();
        let clock = tree.add_clock(Clock::new(FixedClock::default()));
        tree.set_root(clock).unwrap();

        let mut screen = screen(tree, ScriptedPanel::new(SIZE));
        screen.draw().unwrap();
        assert!(screen.scheduler().contains(Task::Refresh(clock)));

        screen.poll(at(1000));
        assert_eq!(screen.tree().draw_count(clock), 2);

        screen.tree_mut().deactivate(clock);
        screen.poll(at(2000));
        assert!(!screen.scheduler().contains(Task::Refresh(clock)));
        assert_eq!(screen.tree().draw_count(clock), 2);
    }

    #[test]
    fn test_backlight_is_clamped_and_forwarded() {
        let tree = WidgetTree::new();
        let config = GuiConfig {
            backlight: 60,
            ..GuiConfig::default()
        };
        let mut screen = Screen::with_config(FrameBuffer::new(SIZE), ScriptedPanel::new(SIZE), tree, config);
        assert_eq!(screen.panel().backlight(), Some(60));

        screen.set_backlight(150);
        assert_eq!(screen.backlight(), 100);
        assert_eq!(screen.panel().backlight(), Some(100));
    }
}
