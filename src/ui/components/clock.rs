//! Periodically refreshed clock display

use alloc::boxed::Box;
use core::fmt::{self, Write};

use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;
use log::warn;

use crate::error::GuiResult;
use crate::ui::canvas::Canvas;
use crate::ui::core::{Align, Colors};

/// Broken-down local time as reported by a [`WallClock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Source of local wall-clock time (RTC, NTP-synced counter, host clock)
pub trait WallClock {
    fn local_time(&self) -> LocalTime;
}

/// Clock text, at most `D.MM.YYYY - H:MM:SS` plus slack.
pub type ClockText = String<32>;

/// Widget showing the current date and time.
///
/// The first draw activates the clock and the owning screen schedules a
/// refresh every `period`. A refresh that finds the clock hidden clears the
/// active flag and the schedule ends; the next draw starts it again.
pub struct Clock {
    source: Box<dyn WallClock>,
    halign: Align,
    valign: Align,
    colors: Colors,
    period: Duration,
    active: bool,
}

impl Clock {
    pub fn new(source: impl WallClock + 'static) -> Self {
        Self {
            source: Box::new(source),
            halign: Align::Center,
            valign: Align::Center,
            colors: Colors::default(),
            period: Duration::from_secs(1),
            active: false,
        }
    }

    pub fn with_alignment(mut self, halign: Align, valign: Align) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    pub fn with_colors(mut self, background: Rgb565, foreground: Rgb565) -> Self {
        self.colors = Colors::new(background, foreground);
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn colors(&self) -> Colors {
        self.colors
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark active; returns true if the clock was previously stopped.
    pub(crate) fn activate(&mut self) -> bool {
        !core::mem::replace(&mut self.active, true)
    }

    pub(crate) fn stop(&mut self) {
        self.active = false;
    }

    pub fn text(&self) -> ClockText {
        format_time(&self.source.local_time())
    }

    pub(crate) fn draw<D>(&self, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let text = self.text();
        canvas.clear()?;
        canvas.text(self.halign, self.valign, &text)
    }
}

fn format_time(t: &LocalTime) -> ClockText {
    let mut out = ClockText::new();
    if write!(
        out,
        "{}.{:02}.{} - {}:{:02}:{:02}",
        t.day, t.month, t.year, t.hour, t.minute, t.second
    )
    .is_err()
    {
        warn!("Clock text truncated: {:?}", t);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(LocalTime);

    impl WallClock for Fixed {
        fn local_time(&self) -> LocalTime {
            self.0
        }
    }

    #[test]
    fn test_text_format() {
        let clock = Clock::new(Fixed(LocalTime {
            year: 2024,
            month: 3,
            day: 7,
            hour: 9,
            minute: 5,
            second: 0,
        }));
        assert_eq!(clock.text().as_str(), "7.03.2024 - 9:05:00");
    }

    #[test]
    fn test_activation_flag() {
        let mut clock = Clock::new(Fixed(LocalTime::default()));
        assert!(!clock.is_active());
        assert!(clock.activate());
        assert!(!clock.activate());
        clock.stop();
        assert!(clock.activate());
    }

    #[test]
    fn test_widest_text_fits() {
        let text = format_time(&LocalTime {
            year: u16::MAX,
            month: u8::MAX,
            day: u8::MAX,
            hour: u8::MAX,
            minute: u8::MAX,
            second: u8::MAX,
        });
        assert_eq!(text.as_str(), "255.255.65535 - 255:255:255");
    }
}
