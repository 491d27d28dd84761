//! Touch sampling, calibration and gesture routing
//!
//! The panel is polled on a fixed period. Each raw sample is calibrated into
//! a logical screen point (or treated as absent), then fed to the
//! [`TouchRouter`], which keeps a single captured widget for the duration of
//! a gesture and decides which event, if any, the sample produces.

use embedded_graphics::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GuiResult;
use crate::ui::core::{TouchEvent, WidgetId, Window};

/// Absent samples tolerated before a release is confirmed
pub const DEBOUNCE_SAMPLES: u8 = 1;

/// Display rotation as reported by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    LandscapeFlip,
    PortraitFlip,
}

impl Orientation {
    fn swaps_axes(self) -> bool {
        matches!(self, Orientation::Portrait | Orientation::PortraitFlip)
    }

    fn flips_vertical(self) -> bool {
        matches!(self, Orientation::LandscapeFlip | Orientation::PortraitFlip)
    }
}

/// One raw reading of the touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawTouch {
    pub pressed: bool,
    pub x: u16,
    pub y: u16,
}

/// Hardware collaborator providing touch samples and backlight control
///
/// Pixels go through the separate `DrawTarget`; this trait covers only the
/// remaining panel functions.
pub trait Panel {
    /// Read the controller's current state.
    fn sample_touch(&mut self) -> RawTouch;

    fn orientation(&self) -> Orientation {
        Orientation::Landscape
    }

    /// Set the backlight level in percent.
    fn set_backlight(&mut self, _level: u8) {}
}

/// Raw-unit bounding box of the usable touch area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            x_min: 500,
            x_max: 3500,
            y_min: 500,
            y_max: 3500,
        }
    }
}

impl Calibration {
    /// Map a raw sample to a logical point on a screen of `size`.
    ///
    /// Returns `None` when the panel is not pressed or the reading lies
    /// outside the calibration box.
    pub fn map(&self, raw: RawTouch, orientation: Orientation, size: Size) -> Option<Point> {
        if !raw.pressed
            || raw.x < self.x_min
            || raw.x > self.x_max
            || raw.y < self.y_min
            || raw.y > self.y_max
        {
            return None;
        }

        // Normalized coordinates as (numerator, denominator) pairs.
        let mut u = (
            i64::from(raw.x - self.x_min),
            i64::from(self.x_max.saturating_sub(self.x_min)).max(1),
        );
        let mut v = (
            i64::from(raw.y - self.y_min),
            i64::from(self.y_max.saturating_sub(self.y_min)).max(1),
        );
        if orientation.swaps_axes() {
            core::mem::swap(&mut u, &mut v);
        }
        if orientation.flips_vertical() {
            v.0 = v.1 - v.0;
        }

        let x = u.0 * i64::from(size.width) / u.1;
        let y = v.0 * i64::from(size.height) / v.1;
        Some(Point::new(x as i32, y as i32))
    }
}

/// The widget holding the current gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub target: WidgetId,
    /// Window resolved by the hit-test at touch-down
    pub window: Window,
    pub start: Point,
    pub current: Point,
    /// Consecutive absent samples
    pub missed: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Captured,
    Debouncing,
}

/// An event to deliver to a captured widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub target: WidgetId,
    pub window: Window,
    pub event: TouchEvent,
}

/// Single-finger gesture state machine
#[derive(Debug, Default)]
pub struct TouchRouter {
    capture: Option<Capture>,
}

impl TouchRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RouterState {
        match &self.capture {
            None => RouterState::Idle,
            Some(c) if c.missed == 0 => RouterState::Captured,
            Some(_) => RouterState::Debouncing,
        }
    }

    pub fn capture(&self) -> Option<&Capture> {
        self.capture.as_ref()
    }

    /// Drop the current gesture without dispatching anything.
    pub fn reset(&mut self) {
        self.capture = None;
    }

    /// Advance the state machine with one calibrated sample.
    ///
    /// `hit_test` is consulted only when a new gesture starts; an error from
    /// it leaves the router idle.
    pub fn step<F>(&mut self, sample: Option<Point>, hit_test: F) -> GuiResult<Option<Dispatch>>
    where
        F: FnOnce(Point) -> GuiResult<(WidgetId, Window)>,
    {
        match (self.capture.as_mut(), sample) {
            (None, None) => Ok(None),
            (None, Some(pos)) => {
                let (target, window) = hit_test(pos)?;
                debug!("Touch down at ({}, {}) captured by {:?}", pos.x, pos.y, target);
                self.capture = Some(Capture {
                    target,
                    window,
                    start: pos,
                    current: pos,
                    missed: 0,
                });
                Ok(Some(Dispatch {
                    target,
                    window,
                    event: TouchEvent::Press(pos),
                }))
            }
            (Some(capture), Some(pos)) => {
                capture.current = pos;
                capture.missed = 0;
                Ok(Some(Dispatch {
                    target: capture.target,
                    window: capture.window,
                    event: TouchEvent::Drag(pos),
                }))
            }
            (Some(capture), None) if capture.missed < DEBOUNCE_SAMPLES => {
                capture.missed += 1;
                Ok(None)
            }
            (Some(capture), None) => {
                let capture = *capture;
                self.capture = None;
                debug!(
                    "Release at ({}, {}) on {:?}",
                    capture.current.x, capture.current.y, capture.target
                );
                Ok(Some(Dispatch {
                    target: capture.target,
                    window: capture.window,
                    event: TouchEvent::Release(capture.current),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuiError;
    use alloc::vec::Vec;
    use slotmap::SlotMap;

    const SIZE: Size = Size::new(320, 240);

    fn raw(x: u16, y: u16) -> RawTouch {
        RawTouch { pressed: true, x, y }
    }

    #[test]
    fn test_calibration_maps_corners() {
        let cal = Calibration::default();
        let o = Orientation::Landscape;
        assert_eq!(cal.map(raw(500, 500), o, SIZE), Some(Point::new(0, 0)));
        assert_eq!(cal.map(raw(3500, 3500), o, SIZE), Some(Point::new(320, 240)));
        assert_eq!(cal.map(raw(2000, 2000), o, SIZE), Some(Point::new(160, 120)));
    }

    #[test]
    fn test_calibration_rejects_outside_and_released() {
        let cal = Calibration::default();
        let o = Orientation::Landscape;
        assert_eq!(cal.map(raw(499, 1000), o, SIZE), None);
        assert_eq!(cal.map(raw(1000, 3501), o, SIZE), None);
        let released = RawTouch {
            pressed: false,
            x: 1000,
            y: 1000,
        };
        assert_eq!(cal.map(released, o, SIZE), None);
    }

    #[test]
    fn test_orientation_swaps_and_flips() {
        let cal = Calibration::default();
        // 25% along raw x, 75% along raw y
        let sample = raw(1250, 2750);
        let size = Size::new(400, 200);

        assert_eq!(cal.map(sample, Orientation::Landscape, size), Some(Point::new(100, 150)));
        assert_eq!(cal.map(sample, Orientation::Portrait, size), Some(Point::new(300, 50)));
        assert_eq!(cal.map(sample, Orientation::LandscapeFlip, size), Some(Point::new(100, 50)));
        assert_eq!(cal.map(sample, Orientation::PortraitFlip, size), Some(Point::new(300, 150)));
    }

    #[test]
    fn test_one_missed_sample_does_not_release() {
        let mut ids: SlotMap<WidgetId, ()> = SlotMap::with_key();
        let target = ids.insert(());
        let window = Window::new(0, 0, 320, 240);
        let mut router = TouchRouter::new();
        let mut hits = 0;

        let samples = [
            Some(Point::new(10, 10)),
            Some(Point::new(12, 10)),
            None,
            Some(Point::new(14, 10)),
            None,
            None,
        ];
        let mut events = Vec::new();
        for sample in samples {
            let dispatched = router
                .step(sample, |_| {
                    hits += 1;
                    Ok((target, window))
                })
                .unwrap();
            events.push(dispatched.map(|d| d.event));
        }

        assert_eq!(hits, 1);
        assert_eq!(
            events,
            [
                Some(TouchEvent::Press(Point::new(10, 10))),
                Some(TouchEvent::Drag(Point::new(12, 10))),
                None,
                Some(TouchEvent::Drag(Point::new(14, 10))),
                None,
                Some(TouchEvent::Release(Point::new(14, 10))),
            ]
        );
        assert_eq!(router.state(), RouterState::Idle);
    }

    #[test]
    fn test_states_follow_samples() {
        let mut ids: SlotMap<WidgetId, ()> = SlotMap::with_key();
        let target = ids.insert(());
        let window = Window::new(0, 0, 320, 240);
        let mut router = TouchRouter::new();

        router.step(Some(Point::new(1, 1)), |_| Ok((target, window))).unwrap();
        assert_eq!(router.state(), RouterState::Captured);
        router.step(None, |_| Ok((target, window))).unwrap();
        assert_eq!(router.state(), RouterState::Debouncing);
        router.reset();
        assert_eq!(router.state(), RouterState::Idle);
    }

    #[test]
    fn test_hit_test_error_leaves_router_idle() {
        let mut router = TouchRouter::new();
        let result = router.step(Some(Point::new(1, 1)), |_| Err(GuiError::NoRoot));
        assert!(matches!(result, Err(GuiError::NoRoot)));
        assert_eq!(router.state(), RouterState::Idle);
    }
}
