//! Label that runs a command when tapped

use alloc::boxed::Box;
use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::error::GuiResult;
use crate::ui::canvas::Canvas;
use crate::ui::components::label::Label;
use crate::ui::core::Colors;
use crate::value::{ValueId, ValueStore};

/// Action run by a [`Button`]
pub type Command = Box<dyn FnMut()>;

/// A [`Label`] whose release runs a command
///
/// The command fires on every confirmed release of a gesture that started on
/// the button, including one whose finger slid off before lifting.
pub struct Button {
    label: Label,
    command: Command,
}

impl Button {
    pub fn new(label: Label, command: impl FnMut() + 'static) -> Self {
        Self {
            label,
            command: Box::new(command),
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn value_id(&self) -> ValueId {
        self.label.value_id()
    }

    pub fn colors(&self) -> Colors {
        self.label.colors()
    }

    pub(crate) fn press(&mut self) {
        (self.command)();
    }

    pub(crate) fn draw<D>(&self, values: &ValueStore, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        self.label.draw(values, canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use core::cell::Cell;

    #[test]
    fn test_press_runs_command() {
        let mut values = ValueStore::default();
        let text = values.create(String::from("Go"));
        let presses = Rc::new(Cell::new(0));
        let counter = presses.clone();
        let mut button = Button::new(Label::new(text), move || counter.set(counter.get() + 1));

        button.press();
        button.press();
        assert_eq!(presses.get(), 2);
        assert_eq!(button.label().text(&values).unwrap(), "Go");
    }
}
