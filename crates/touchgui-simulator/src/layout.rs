//! Demo widget tree: a left-hand main menu with nested menus, sliders and a clock.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Datelike, Local, Timelike};
use embedded_graphics::pixelcolor::Rgb565;
use touchgui::ui::styling::colors::{BLACK, BLUE, GREEN, RED, WHITE, YELLOW};
use touchgui::ui::{
    Clock, Colors, Direction, Frame, HeaderPosition, Label, LocalTime, Menu, PageStyle, Slider,
    WallClock, WidgetId,
};
use touchgui::{GuiResult, WidgetTree};

/// Thickness of every menu header in pixels
const TITLE_SIZE: u32 = 60;

/// Host clock in the local time zone
pub struct SystemClock;

impl WallClock for SystemClock {
    fn local_time(&self) -> LocalTime {
        let now = Local::now();
        LocalTime {
            year: u16::try_from(now.year()).unwrap_or_default(),
            month: now.month() as u8,
            day: now.day() as u8,
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            second: now.second() as u8,
        }
    }
}

fn style(title_bg: Rgb565, title_fg: Rgb565) -> PageStyle {
    PageStyle {
        title: Colors::new(title_bg, title_fg),
        body: Colors::new(BLACK, WHITE),
    }
}

/// A built demo plus the channel through which the settings slider asks for
/// a new backlight level.
pub struct Demo {
    pub tree: WidgetTree,
    pub backlight_request: Rc<Cell<Option<u8>>>,
}

/// Row or column of `L<n>: [slider] <value>%`.
fn light_control(tree: &mut WidgetTree, number: i32, direction: Direction) -> GuiResult<WidgetId> {
    let frame = tree.add_frame(Frame::new(direction));
    let name = tree.create_value(number);
    let level = tree.create_value(0i32);

    let label = tree.add_label(Label::new(name).with_template("L{}: "))?;
    let slider = tree.add_slider(Slider::new(level).with_direction(direction))?;
    let value = tree.add_label(Label::new(level).with_template("{}%"))?;
    tree.pack(frame, label, 1)?;
    tree.pack(frame, slider, 4)?;
    tree.pack(frame, value, 1)?;
    Ok(frame)
}

pub fn build() -> GuiResult<Demo> {
    let mut tree = WidgetTree::new();
    let backlight_request = Rc::new(Cell::new(None));

    let main = tree.add_menu(
        Menu::new(TITLE_SIZE)
            .with_position(HeaderPosition::Left)
            .on_change(|| log::info!("Main menu page changed")),
    );
    tree.set_root(main)?;

    // Lights: a nested menu per room
    let light = tree.add_page(main, "Light", style(YELLOW, BLACK), Direction::Vertical)?;
    let rooms = tree.add_menu(Menu::new(TITLE_SIZE));
    tree.pack(light, rooms, 1)?;

    let living = tree.add_page(rooms, "Living", style(YELLOW, BLACK), Direction::Vertical)?;
    for n in 1..=2 {
        let row = light_control(&mut tree, n, Direction::Horizontal)?;
        tree.pack(living, row, 1)?;
    }

    let bedroom = tree.add_page(rooms, "Bedroom", style(YELLOW, BLACK), Direction::Horizontal)?;
    let first = tree.add_text("Bedroom")?;
    let second = tree.add_text("Second label")?;
    tree.pack(bedroom, first, 1)?;
    tree.pack(bedroom, second, 1)?;

    let workshop = tree.add_page(rooms, "Workshop", style(YELLOW, BLACK), Direction::Vertical)?;
    let benches = tree.add_menu(Menu::new(TITLE_SIZE).with_position(HeaderPosition::Left));
    tree.pack(workshop, benches, 1)?;
    for bench in 1..=3 {
        let title = format!("Light {}", bench);
        let page = tree.add_page(benches, &title, style(RED, WHITE), Direction::Horizontal)?;
        for n in 1..=2 {
            let column = light_control(&mut tree, n, Direction::Vertical)?;
            tree.pack(page, column, 1)?;
        }
    }

    let music = tree.add_page(main, "Music", style(RED, WHITE), Direction::Vertical)?;
    let text = tree.add_text("Controls the stereo")?;
    let play = tree.add_text_button("Play", || log::info!("Play pressed"))?;
    tree.pack(music, text, 1)?;
    tree.pack(music, play, 1)?;

    let weather = tree.add_page(main, "Weather", style(BLUE, WHITE), Direction::Vertical)?;
    let text = tree.add_text("Sunny again soon")?;
    tree.pack(weather, text, 1)?;

    let clock_page = tree.add_page(main, "Clock", style(GREEN, BLACK), Direction::Vertical)?;
    let clock = tree.add_clock(Clock::new(SystemClock));
    tree.pack(clock_page, clock, 1)?;

    // Settings: backlight slider bound to a shared level
    let settings = tree.add_page(main, "Settings", style(YELLOW, BLACK), Direction::Vertical)?;
    let heading = tree.add_text("Backlight")?;
    tree.pack(settings, heading, 1)?;

    let row = tree.add_frame(Frame::new(Direction::Horizontal));
    let level = tree.create_value(100i32);
    let request = backlight_request.clone();
    let slider = tree.add_slider(
        Slider::new(level)
            .with_range(1, 100)
            .on_release(move |v| request.set(Some(v.clamp(0, 100) as u8))),
    )?;
    let percent = tree.add_label(Label::new(level).with_template("{}%"))?;
    tree.pack(row, slider, 5)?;
    tree.pack(row, percent, 1)?;
    tree.pack(settings, row, 1)?;

    let more = tree.add_text("More settings")?;
    tree.pack(settings, more, 4)?;

    let photos = tree.add_page(main, "Photos", style(RED, WHITE), Direction::Vertical)?;
    let text = tree.add_text("Photos")?;
    tree.pack(photos, text, 1)?;

    Ok(Demo {
        tree,
        backlight_request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_fields_in_range() {
        let t = SystemClock.local_time();
        assert!((1..=12).contains(&t.month));
        assert!((1..=31).contains(&t.day));
        assert!(t.hour < 24 && t.minute < 60 && t.second < 61);
        assert!(t.year >= 2024);
    }

    #[test]
    fn test_demo_builds() {
        let demo = build().unwrap();
        let root = demo.tree.root().unwrap();
        assert_eq!(demo.tree.children(root).len(), 6);
    }
}
