//! Desktop simulator for the touchgui widget toolkit.
//!
//! Renders the demo layout in an SDL2 window via `embedded-graphics-simulator`.
//! The left mouse button acts as the finger: press, drag and release are
//! turned into raw touch samples that go through the same calibration and
//! routing as on hardware.
//!
//! # Key bindings
//!
//! | Key   | Action |
//! |-------|--------|
//! | Q/Esc | Quit   |

mod layout;

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};

use touchgui::{Calibration, FrameBuffer, Panel, RawTouch, Screen};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 320;
const DISPLAY_HEIGHT_PX: u32 = 240;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

// ---------------------------------------------------------------------------
// Mouse-driven touch panel
// ---------------------------------------------------------------------------

/// Panel fed by SDL mouse events.
///
/// Logical mouse positions are encoded back into raw controller units so the
/// screen's calibration maps them onto the same pixels.
struct SimulatorPanel {
    size: Size,
    calibration: Calibration,
    contact: Option<Point>,
}

impl SimulatorPanel {
    fn new(size: Size) -> Self {
        Self {
            size,
            calibration: Calibration::default(),
            contact: None,
        }
    }

    fn press(&mut self, point: Point) {
        self.contact = Some(point);
    }

    fn drag(&mut self, point: Point) {
        if self.contact.is_some() {
            self.contact = Some(point);
        }
    }

    fn lift(&mut self) {
        self.contact = None;
    }

    fn to_raw(pos: i32, extent: u32, min: u16, max: u16) -> u16 {
        let span = i64::from(max - min);
        let extent = i64::from(extent.max(1));
        let pos = i64::from(pos).clamp(0, extent);
        (i64::from(min) + (pos * span + extent - 1) / extent) as u16
    }
}

impl Panel for SimulatorPanel {
    fn sample_touch(&mut self) -> RawTouch {
        let Some(point) = self.contact else {
            return RawTouch::default();
        };
        let cal = self.calibration;
        RawTouch {
            pressed: true,
            x: Self::to_raw(point.x, self.size.width, cal.x_min, cal.x_max),
            y: Self::to_raw(point.y, self.size.height, cal.y_min, cal.y_max),
        }
    }

    fn set_backlight(&mut self, level: u8) {
        info!("Backlight set to {}%", level);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting touchgui simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );

    let size = Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX);
    let demo = match layout::build() {
        Ok(demo) => demo,
        Err(e) => {
            error!("Failed to build demo layout: {}", e);
            return;
        }
    };

    let mut screen = Screen::new(FrameBuffer::new(size), SimulatorPanel::new(size), demo.tree);
    let mut display = SimulatorDisplay::<Rgb565>::new(size);
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("touchgui Simulator", &output_settings);

    let start = Instant::now();
    let now = || embassy_time::Instant::from_micros(start.elapsed().as_micros() as u64);

    if let Err(e) = screen.draw() {
        screen.report(e);
    }
    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = screen.display_mut().flush(&mut display);
    window.update(&display);

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }
                }
                SimulatorEvent::MouseButtonDown { point, .. } => screen.panel_mut().press(point),
                SimulatorEvent::MouseMove { point } => screen.panel_mut().drag(point),
                SimulatorEvent::MouseButtonUp { .. } => screen.panel_mut().lift(),
                _ => {}
            }
        }

        // --- Touch sampling and clock refresh -----------------------------
        screen.poll(now());

        if let Some(level) = demo.backlight_request.take() {
            screen.set_backlight(level);
        }

        // --- Render -------------------------------------------------------
        let _ = screen.display_mut().flush(&mut display);
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
