//! Text label bound to a reactive value

use alloc::string::String;
use core::any::Any;
use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::error::GuiResult;
use crate::ui::canvas::Canvas;
use crate::ui::core::{Align, Colors};
use crate::value::{Value, ValueId, ValueStore};

/// Placeholder replaced by the value's text in a label template
const SLOT: &str = "{}";

/// Label displaying a value through a one-slot template
///
/// The template is any text containing `{}` once, e.g. `"L{}: "` or
/// `"{}%"`. The label registers itself as a dependent of its value, so
/// changing the value redraws the label while it is visible.
///
/// # Examples
/// ```ignore
/// let level = tree.create_value(100i32);
/// let label = tree.add_label(Label::new(level).with_template("{}%"))?;
/// ```
pub struct Label {
    value: ValueId,
    template: String,
    halign: Align,
    valign: Align,
    colors: Colors,
}

impl Label {
    pub fn new<T: Any + fmt::Display>(value: Value<T>) -> Self {
        Self {
            value: value.id(),
            template: String::from(SLOT),
            halign: Align::Center,
            valign: Align::Center,
            colors: Colors::default(),
        }
    }

    /// Set the decoration template. Text after the first `{}` follows the value.
    pub fn with_template(mut self, template: &str) -> Self {
        self.template = String::from(template);
        self
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

    pub fn value_id(&self) -> ValueId {
        self.value
    }

    pub fn colors(&self) -> Colors {
        self.colors
    }

    /// The text currently shown: the template with its slot filled.
    pub fn text(&self, values: &ValueStore) -> GuiResult<String> {
        let mut out = String::new();
        match self.template.split_once(SLOT) {
            Some((prefix, suffix)) => {
                out.push_str(prefix);
                values.write_value(self.value, &mut out)?;
                out.push_str(suffix);
            }
            // A template without a slot shows as-is.
            None => out.push_str(&self.template),
        }
        Ok(out)
    }

    /// Clear the configured region and render the text.
    pub(crate) fn draw<D>(&self, values: &ValueStore, canvas: &mut Canvas<'_, D>) -> GuiResult<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: fmt::Debug,
    {
        let text = self.text(values)?;
        canvas.clear()?;
        canvas.text(self.halign, self.valign, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_fills_single_slot() {
        let mut values = ValueStore::new();
        let level = values.create(42i32);

        let label = Label::new(level).with_template("L{}: ");
        assert_eq!(label.text(&values).unwrap(), "L42: ");

        let label = Label::new(level).with_template("{}%");
        assert_eq!(label.text(&values).unwrap(), "42%");

        let label = Label::new(level);
        assert_eq!(label.text(&values).unwrap(), "42");
    }

    #[test]
    fn test_template_without_slot_is_literal() {
        let mut values = ValueStore::new();
        let level = values.create(1i32);
        let label = Label::new(level).with_template("static");
        assert_eq!(label.text(&values).unwrap(), "static");
    }
}
