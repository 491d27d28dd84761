//! Test doubles for the panel and wall clock

use alloc::collections::VecDeque;

use embedded_graphics::prelude::*;

use crate::touch::{Calibration, Panel, RawTouch};
use crate::ui::components::{LocalTime, WallClock};

/// Panel replaying a fixed list of samples, released once exhausted.
pub struct ScriptedPanel {
    size: Size,
    calibration: Calibration,
    queue: VecDeque<RawTouch>,
    samples: usize,
    backlight: Option<u8>,
}

impl ScriptedPanel {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            calibration: Calibration::default(),
            queue: VecDeque::new(),
            samples: 0,
            backlight: None,
        }
    }

    /// Queue a press at logical `point`, encoded in raw units so that the
    /// default landscape calibration maps it back exactly.
    pub fn touch(&mut self, point: Point) {
        let cal = self.calibration;
        let raw = |pos: i32, extent: u32, min: u16, max: u16| {
            let span = i64::from(max - min);
            let extent = i64::from(extent);
            // Round up so the floor in the forward mapping lands on `pos`.
            let offset = (i64::from(pos) * span + extent - 1) / extent;
            (i64::from(min) + offset) as u16
        };
        self.queue.push_back(RawTouch {
            pressed: true,
            x: raw(point.x, self.size.width, cal.x_min, cal.x_max),
            y: raw(point.y, self.size.height, cal.y_min, cal.y_max),
        });
    }

    pub fn release(&mut self) {
        self.queue.push_back(RawTouch::default());
    }

    /// Number of samples read so far.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn backlight(&self) -> Option<u8> {
        self.backlight
    }
}

impl Panel for ScriptedPanel {
    fn sample_touch(&mut self) -> RawTouch {
        self.samples += 1;
        self.queue.pop_front().unwrap_or_default()
    }

    fn set_backlight(&mut self, level: u8) {
        self.backlight = Some(level);
    }
}

/// Wall clock frozen at one instant
#[derive(Default)]
pub struct FixedClock(pub LocalTime);

impl WallClock for FixedClock {
    fn local_time(&self) -> LocalTime {
        self.0
    }
}
