//! Widget arena: ownership, layout, drawing and touch dispatch
//!
//! Widgets live in a [`SlotMap`] keyed by [`WidgetId`]. Containers refer to
//! their children by id and every widget records its parent, so the tree has
//! exactly one owner per node and packing a widget twice or into its own
//! subtree is rejected up front.

use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};
use slotmap::SlotMap;

use crate::error::{GuiError, GuiResult};
use crate::ui::canvas::Canvas;
use crate::ui::components::{Button, Clock, Label, Slider};
use crate::ui::core::{Colors, Direction, TouchEvent, WidgetId, Window};
use crate::ui::layouts::{Frame, Menu, Page, PageStyle};
use crate::value::{Value, ValueStore};

/// State shared by every widget
#[derive(Debug, Clone, Copy, Default)]
pub struct WidgetBase {
    /// Set by every draw, cleared by [`WidgetTree::deactivate`]
    pub visible: bool,
    /// Window of the most recent draw
    pub window: Option<Window>,
    /// Number of times the widget has been drawn
    pub draws: u32,
    pub parent: Option<WidgetId>,
}

/// The closed set of widget variants
pub enum WidgetKind {
    Label(Label),
    Button(Button),
    Slider(Slider),
    Frame(Frame),
    Menu(Menu),
    Page(Page),
    Clock(Clock),
}

/// Data-free tag of a [`WidgetKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetClass {
    Label,
    Button,
    Slider,
    Frame,
    Menu,
    Page,
    Clock,
}

impl WidgetKind {
    pub fn class(&self) -> WidgetClass {
        match self {
            WidgetKind::Label(_) => WidgetClass::Label,
            WidgetKind::Button(_) => WidgetClass::Button,
            WidgetKind::Slider(_) => WidgetClass::Slider,
            WidgetKind::Frame(_) => WidgetClass::Frame,
            WidgetKind::Menu(_) => WidgetClass::Menu,
            WidgetKind::Page(_) => WidgetClass::Page,
            WidgetKind::Clock(_) => WidgetClass::Clock,
        }
    }

    /// Colors the canvas is configured with before the widget draws.
    pub fn colors(&self) -> Colors {
        match self {
            WidgetKind::Label(label) => label.colors(),
            WidgetKind::Button(button) => button.colors(),
            WidgetKind::Slider(slider) => slider.colors(),
            WidgetKind::Frame(frame) => frame.colors(),
            WidgetKind::Menu(menu) => menu.colors(),
            WidgetKind::Page(page) => page.frame.colors(),
            WidgetKind::Clock(clock) => clock.colors(),
        }
    }

    /// The child list of frames and pages.
    fn frame(&self) -> Option<&Frame> {
        match self {
            WidgetKind::Frame(frame) => Some(frame),
            WidgetKind::Page(page) => Some(&page.frame),
            _ => None,
        }
    }

    fn frame_mut(&mut self) -> Option<&mut Frame> {
        match self {
            WidgetKind::Frame(frame) => Some(frame),
            WidgetKind::Page(page) => Some(&mut page.frame),
            _ => None,
        }
    }
}

pub struct WidgetNode {
    pub base: WidgetBase,
    pub kind: WidgetKind,
}

/// Owner of every widget and reactive value of a screen
#[derive(Default)]
pub struct WidgetTree {
    pub(crate) widgets: SlotMap<WidgetId, WidgetNode>,
    pub(crate) values: ValueStore,
    root: Option<WidgetId>,
    refresh_requests: Vec<(WidgetId, Duration)>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Values ---

    pub fn create_value<T: Any + fmt::Display>(&mut self, value: T) -> Value<T> {
        self.values.create(value)
    }

    pub fn value<T: Any>(&self, handle: Value<T>) -> GuiResult<&T> {
        self.values.get(handle)
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    // --- Building ---

    fn insert(&mut self, kind: WidgetKind) -> WidgetId {
        self.widgets.insert(WidgetNode {
            base: WidgetBase::default(),
            kind,
        })
    }

    /// Add a label and register it as a dependent of its value.
    pub fn add_label(&mut self, label: Label) -> GuiResult<WidgetId> {
        let value = label.value_id();
        let id = self.insert(WidgetKind::Label(label));
        if let Err(e) = self.values.subscribe(value, id) {
            self.widgets.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Add a label showing fixed text through an internal value.
    pub fn add_text(&mut self, text: &str) -> GuiResult<WidgetId> {
        let value = self.values.create(String::from(text));
        self.add_label(Label::new(value))
    }

    /// Add a button and register it as a dependent of its label's value.
    pub fn add_button(&mut self, button: Button) -> GuiResult<WidgetId> {
        let value = button.value_id();
        let id = self.insert(WidgetKind::Button(button));
        if let Err(e) = self.values.subscribe(value, id) {
            self.widgets.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Add a button with a fixed caption.
    pub fn add_text_button(&mut self, text: &str, command: impl FnMut() + 'static) -> GuiResult<WidgetId> {
        let value = self.values.create(String::from(text));
        self.add_button(Button::new(Label::new(value), command))
    }

    /// Add a slider and register it as a dependent of its value.
    pub fn add_slider(&mut self, slider: Slider) -> GuiResult<WidgetId> {
        let value = slider.value().id();
        let id = self.insert(WidgetKind::Slider(slider));
        if let Err(e) = self.values.subscribe(value, id) {
            self.widgets.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    pub fn add_frame(&mut self, frame: Frame) -> WidgetId {
        self.insert(WidgetKind::Frame(frame))
    }

    pub fn add_menu(&mut self, menu: Menu) -> WidgetId {
        self.insert(WidgetKind::Menu(menu))
    }

    pub fn add_clock(&mut self, clock: Clock) -> WidgetId {
        self.insert(WidgetKind::Clock(clock))
    }

    /// Append a page to `menu` and return it for packing.
    pub fn add_page(
        &mut self,
        menu: WidgetId,
        title: &str,
        style: PageStyle,
        direction: Direction,
    ) -> GuiResult<WidgetId> {
        match self.node(menu)?.kind {
            WidgetKind::Menu(_) => {}
            _ => return Err(GuiError::NotAMenu(menu)),
        }

        let page = self.insert(WidgetKind::Page(Page::new(title, style, direction)));
        self.widgets[page].base.parent = Some(menu);
        if let WidgetKind::Menu(m) = &mut self.widgets[menu].kind {
            m.pages.push(page);
        }
        Ok(page)
    }

    /// Append `child` to a frame or page with the given layout weight.
    pub fn pack(&mut self, parent: WidgetId, child: WidgetId, weight: u32) -> GuiResult<()> {
        if self.node(parent)?.kind.frame().is_none() {
            return Err(GuiError::NotAContainer(parent));
        }
        if self.node(child)?.base.parent.is_some() {
            return Err(GuiError::AlreadyPacked { child });
        }
        if child == parent || self.root == Some(child) || self.is_ancestor(child, parent) {
            return Err(GuiError::Cycle { parent, child });
        }

        self.widgets[child].base.parent = Some(parent);
        if let Some(frame) = self.widgets[parent].kind.frame_mut() {
            frame.push(child, weight);
        }
        Ok(())
    }

    /// Whether `ancestor` lies on the parent chain of `id`.
    fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = self.widgets.get(id).and_then(|n| n.base.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.widgets.get(p).and_then(|n| n.base.parent);
        }
        false
    }

    /// Make `id` the widget drawn into the full screen.
    pub fn set_root(&mut self, id: WidgetId) -> GuiResult<()> {
        if self.node(id)?.base.parent.is_some() {
            return Err(GuiError::AlreadyPacked { child: id });
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Remove `id` and its whole subtree, detaching it from its parent and
    /// from every value it depends on.
    pub fn remove(&mut self, id: WidgetId) -> GuiResult<()> {
        let parent = self.node(id)?.base.parent;
        if let Some(parent) = parent {
            match &mut self.widgets[parent].kind {
                WidgetKind::Menu(menu) => {
                    menu.pages.retain(|&p| p != id);
                    menu.active = menu.active.min(menu.pages.len().saturating_sub(1));
                }
                kind => {
                    if let Some(frame) = kind.frame_mut() {
                        frame.remove(id);
                    }
                }
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut pending = alloc::vec![id];
        while let Some(current) = pending.pop() {
            pending.extend(self.children(current));
            self.values.unsubscribe(current);
            self.refresh_requests.retain(|&(w, _)| w != current);
            self.widgets.remove(current);
        }
        Ok(())
    }

    // --- Queries ---

    fn node(&self, id: WidgetId) -> GuiResult<&WidgetNode> {
        self.widgets.get(id).ok_or(GuiError::UnknownWidget(id))
    }

    fn node_mut(&mut self, id: WidgetId) -> GuiResult<&mut WidgetNode> {
        self.widgets.get_mut(id).ok_or(GuiError::UnknownWidget(id))
    }

    fn menu(&self, id: WidgetId) -> GuiResult<&Menu> {
        match &self.node(id)?.kind {
            WidgetKind::Menu(menu) => Ok(menu),
            _ => Err(GuiError::NotAMenu(id)),
        }
    }

    pub fn get(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.widgets.get(id)
    }

    pub fn class(&self, id: WidgetId) -> Option<WidgetClass> {
        self.widgets.get(id).map(|n| n.kind.class())
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.widgets.get(id).is_some_and(|n| n.base.visible)
    }

    /// Window of the widget's last draw.
    pub fn window(&self, id: WidgetId) -> Option<Window> {
        self.widgets.get(id).and_then(|n| n.base.window)
    }

    pub fn draw_count(&self, id: WidgetId) -> u32 {
        self.widgets.get(id).map_or(0, |n| n.base.draws)
    }

    /// Direct children: frame and page children, or menu pages.
    pub fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        match self.widgets.get(id).map(|n| &n.kind) {
            Some(WidgetKind::Menu(menu)) => menu.pages.clone(),
            Some(kind) => kind.frame().map(Frame::child_ids).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Page of `menu` whose title equals `title`.
    pub fn page_by_title(&self, menu: WidgetId, title: &str) -> GuiResult<WidgetId> {
        self.menu(menu)?
            .pages
            .iter()
            .copied()
            .find(|&p| matches!(&self.widgets[p].kind, WidgetKind::Page(page) if page.title == title))
            .ok_or_else(|| GuiError::PageNotFound {
                menu,
                title: String::from(title),
            })
    }

    pub fn active_page(&self, menu: WidgetId) -> GuiResult<WidgetId> {
        self.menu(menu)?.active_page().ok_or(GuiError::NoPages(menu))
    }

    // --- Drawing ---

    /// Draw the root widget into `window`.
    pub fn draw_root<D>(&mut self, window: Window, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let root = self.root.ok_or(GuiError::NoRoot)?;
        self.draw(root, window, canvas)
    }

    /// Draw `id` into `window`, recording the window and marking it visible.
    pub fn draw<D>(&mut self, id: WidgetId, window: Window, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let (class, colors) = {
            let node = self.node_mut(id)?;
            node.base.window = Some(window);
            node.base.visible = true;
            node.base.draws = node.base.draws.saturating_add(1);
            (node.kind.class(), node.kind.colors())
        };
        canvas.configure(window, colors);

        match class {
            WidgetClass::Label => {
                if let WidgetKind::Label(label) = &self.widgets[id].kind {
                    label.draw(&self.values, canvas)?;
                }
            }
            WidgetClass::Button => {
                if let WidgetKind::Button(button) = &self.widgets[id].kind {
                    button.draw(&self.values, canvas)?;
                }
            }
            WidgetClass::Slider => {
                if let WidgetKind::Slider(slider) = &self.widgets[id].kind {
                    let value = *self.values.get(slider.value())?;
                    slider.draw(value, canvas)?;
                }
            }
            WidgetClass::Clock => {
                if let WidgetKind::Clock(clock) = &mut self.widgets[id].kind {
                    clock.draw(canvas)?;
                    if clock.activate() {
                        debug!("Clock {:?} activated", id);
                        self.refresh_requests.push((id, clock.period()));
                    }
                }
            }
            WidgetClass::Frame | WidgetClass::Page => self.draw_children(id, window, canvas)?,
            WidgetClass::Menu => self.draw_menu(id, window, canvas)?,
        }
        Ok(())
    }

    fn draw_children<D>(&mut self, id: WidgetId, window: Window, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let layout = match self.widgets[id].kind.frame() {
            Some(frame) if frame.is_empty() => return Ok(()),
            Some(frame) => frame.layout(window),
            None => return Ok(()),
        };
        if layout.is_empty() {
            return Err(GuiError::ZeroWeight(id));
        }
        for (child, child_window) in layout {
            self.draw(child, child_window, canvas)?;
        }
        Ok(())
    }

    fn draw_menu<D>(&mut self, id: WidgetId, window: Window, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let (page, content) = {
            let menu = self.menu(id)?;
            let page = menu.active_page().ok_or(GuiError::NoPages(id))?;
            let titles: Vec<(&str, Colors)> = menu
                .pages
                .iter()
                .filter_map(|&p| match &self.widgets.get(p)?.kind {
                    WidgetKind::Page(page) => Some((page.title.as_str(), page.title_colors)),
                    _ => None,
                })
                .collect();
            menu.draw_header(window, &titles, canvas)?;
            (page, menu.content_window(window))
        };
        self.draw(page, content, canvas)
    }

    /// Draw `id` again into its last window. Never-drawn widgets are skipped.
    pub fn redraw<D>(&mut self, id: WidgetId, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        match self.window(id) {
            Some(window) => self.draw(id, window, canvas),
            None => Ok(()),
        }
    }

    /// Mark `id` and all of its descendants invisible.
    pub fn deactivate(&mut self, id: WidgetId) {
        let mut pending = alloc::vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.widgets.get_mut(current) {
                node.base.visible = false;
            }
            pending.extend(self.children(current));
        }
    }

    // --- Reactive values ---

    /// Store `value` and redraw every visible dependent, in registration order.
    pub fn set_value<T, D>(&mut self, handle: Value<T>, value: T, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        T: Any + fmt::Display,
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let dependents = self.values.replace(handle, value)?;
        self.notify(&dependents, canvas)
    }

    /// Mutate a value in place, then redraw its visible dependents.
    pub fn update_value<T, D, F>(&mut self, handle: Value<T>, f: F, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        T: Any,
        F: FnOnce(&mut T),
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let dependents = self.values.modify(handle, f)?;
        self.notify(&dependents, canvas)
    }

    fn notify<D>(&mut self, dependents: &[WidgetId], canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        for &widget in dependents {
            if self.is_visible(widget) {
                self.redraw(widget, canvas)?;
            }
        }
        Ok(())
    }

    // --- Touch ---

    /// Hit-test from the root with the full screen window.
    pub fn hit_test_root(&self, pos: Point, window: Window) -> GuiResult<(WidgetId, Window)> {
        let root = self.root.ok_or(GuiError::NoRoot)?;
        self.hit_test(root, pos, window)
    }

    /// Resolve the widget under `pos` together with the window it occupies.
    ///
    /// Containers forward to the child whose window holds the point; a menu
    /// header band resolves to the menu itself.
    pub fn hit_test(&self, id: WidgetId, pos: Point, window: Window) -> GuiResult<(WidgetId, Window)> {
        let node = self.node(id)?;
        let outside = || GuiError::OutsideWindow {
            widget: id,
            x: pos.x,
            y: pos.y,
            window,
        };

        match &node.kind {
            WidgetKind::Frame(frame) | WidgetKind::Page(Page { frame, .. }) => {
                if !window.contains(pos) {
                    return Err(outside());
                }
                if frame.is_empty() {
                    return Ok((id, window));
                }
                let axis = frame.direction();
                let pos_on_axis = match axis {
                    Direction::Horizontal => pos.x,
                    Direction::Vertical => pos.y,
                };
                let (child, child_window) = frame
                    .child_at(pos_on_axis, window)
                    .ok_or(GuiError::ZeroWeight(id))?;
                self.hit_test(child, pos, child_window)
            }
            WidgetKind::Menu(menu) => {
                if !window.contains(pos) {
                    return Err(outside());
                }
                let page = menu.active_page().ok_or(GuiError::NoPages(id))?;
                if menu.in_header(pos, window) {
                    Ok((id, window))
                } else {
                    self.hit_test(page, pos, menu.content_window(window))
                }
            }
            WidgetKind::Label(_) | WidgetKind::Button(_) | WidgetKind::Slider(_) | WidgetKind::Clock(_) => {
                Ok((id, window))
            }
        }
    }

    /// Deliver a routed touch event to a captured widget.
    pub fn dispatch<D>(
        &mut self,
        id: WidgetId,
        event: TouchEvent,
        window: Window,
        canvas: &mut Canvas<'_, D>,
    ) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        match event {
            TouchEvent::Press(pos) | TouchEvent::Drag(pos) => self.on_move(id, pos, window, canvas),
            TouchEvent::Release(pos) => self.on_release(id, pos, window, canvas),
        }
    }

    /// Contact at `pos` while `id` is captured in `window`.
    pub fn on_move<D>(&mut self, id: WidgetId, pos: Point, window: Window, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let (handle, value) = match &self.node(id)?.kind {
            WidgetKind::Slider(slider) => (slider.value(), slider.value_at(pos, window)),
            _ => return Ok(()),
        };
        if *self.values.get(handle)? != value {
            debug!("Slider {:?} -> {}", id, value);
            self.set_value(handle, value, canvas)?;
        }
        Ok(())
    }

    /// Confirmed release at `pos` on the captured widget `id`.
    pub fn on_release<D>(
        &mut self,
        id: WidgetId,
        pos: Point,
        window: Window,
        canvas: &mut Canvas<'_, D>,
    ) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let class = self.node(id)?.kind.class();
        match class {
            WidgetClass::Slider => {
                let handle = match &self.widgets[id].kind {
                    WidgetKind::Slider(slider) => slider.value(),
                    _ => return Ok(()),
                };
                let value = *self.values.get(handle)?;
                if let WidgetKind::Slider(slider) = &mut self.widgets[id].kind {
                    slider.fire_release(value);
                }
                Ok(())
            }
            WidgetClass::Button => {
                if let WidgetKind::Button(button) = &mut self.widgets[id].kind {
                    debug!("Button {:?} released at ({}, {})", id, pos.x, pos.y);
                    button.press();
                }
                Ok(())
            }
            WidgetClass::Menu => {
                let menu = self.menu(id)?;
                if !menu.in_header(pos, window) {
                    return Ok(());
                }
                let active = menu.active;
                match menu.page_at(pos, window) {
                    Some(index) if index != active => self.switch_page(id, index, canvas),
                    _ => Ok(()),
                }
            }
            _ => {
                warn!("Unhandled release on {:?} ({:?}) at ({}, {})", id, class, pos.x, pos.y);
                Ok(())
            }
        }
    }

    /// Make page `index` of `menu` active.
    ///
    /// Returns `false` if the page was already active.
    pub fn select_page<D>(&mut self, menu: WidgetId, index: usize, canvas: &mut Canvas<'_, D>) -> GuiResult<bool>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let m = self.menu(menu)?;
        let count = m.pages.len();
        if index >= count {
            return Err(GuiError::PageIndex { index, count });
        }
        if index == m.active {
            return Ok(false);
        }
        self.switch_page(menu, index, canvas)?;
        Ok(true)
    }

    fn switch_page<D>(&mut self, id: WidgetId, index: usize, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let previous = self.menu(id)?.active;
        self.show_page(id, index)?;

        if let Err(e) = self.redraw(id, canvas) {
            warn!("Menu {:?} could not show page {}, staying on {}", id, index, previous);
            self.show_page(id, previous)?;
            if let Err(restore) = self.redraw(id, canvas) {
                warn!("Menu {:?} could not redraw page {}: {}", id, previous, restore);
            }
            return Err(e);
        }

        info!("Menu {:?} switched to page {}", id, index);
        if let WidgetKind::Menu(menu) = &mut self.node_mut(id)?.kind {
            menu.notify_change();
        }
        Ok(())
    }

    /// Hide the active page of `id` and make `index` the active one.
    fn show_page(&mut self, id: WidgetId, index: usize) -> GuiResult<()> {
        if let Some(current) = self.menu(id)?.active_page() {
            self.deactivate(current);
        }
        if let WidgetKind::Menu(menu) = &mut self.node_mut(id)?.kind {
            menu.active = index;
        }
        Ok(())
    }

    // --- Timed widgets ---

    /// Clocks activated since the last call, with their refresh periods.
    pub fn take_refresh_requests(&mut self) -> Vec<(WidgetId, Duration)> {
        core::mem::take(&mut self.refresh_requests)
    }

    /// Periodic wake-up of a clock.
    ///
    /// Redraws while the clock is active and visible and returns `true`;
    /// otherwise stops the clock and returns `false` so the caller drops the
    /// schedule.
    pub fn refresh<D>(&mut self, id: WidgetId, canvas: &mut Canvas<'_, D>) -> GuiResult<bool>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let Some(node) = self.widgets.get_mut(id) else {
            return Ok(false);
        };
        let visible = node.base.visible;
        let WidgetKind::Clock(clock) = &mut node.kind else {
            return Ok(false);
        };
        if !(clock.is_active() && visible) {
            debug!("Clock {:?} stopped", id);
            clock.stop();
            return Ok(false);
        }
        self.redraw(id, canvas)?;
        Ok(true)
    }
}
