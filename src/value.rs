//! Reactive values with widget dependents
//!
//! A [`Value<T>`] is a typed, copyable handle to a cell in the [`ValueStore`].
//! Each cell remembers the widgets that display it. Mutating a value through
//! [`WidgetTree::set_value`](crate::ui::WidgetTree::set_value) redraws every
//! dependent that is currently visible, synchronously and in registration
//! order. The store only holds [`WidgetId`]s, so it never keeps a widget alive.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use slotmap::{SlotMap, new_key_type};

use crate::error::{GuiError, GuiResult};
use crate::ui::core::WidgetId;

new_key_type! {
    /// Untyped identifier of a value cell.
    pub struct ValueId;
}

/// Typed handle to a reactive value.
pub struct Value<T> {
    id: ValueId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Value<T> {
    pub fn id(&self) -> ValueId {
        self.id
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Value<T> {}

impl<T> PartialEq for Value<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Value<T> {}

impl<T> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.id).finish()
    }
}

/// Type-erased stored value that can still be displayed.
trait Stored: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: Any + fmt::Display> Stored for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

struct Shown<'a>(&'a dyn Stored);

impl fmt::Display for Shown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_value(f)
    }
}

struct Cell {
    value: Box<dyn Stored>,
    dependents: Vec<WidgetId>,
}

/// Storage for every reactive value of a widget tree.
#[derive(Default)]
pub struct ValueStore {
    cells: SlotMap<ValueId, Cell>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` and return its handle. Values must be displayable so
    /// that labels can render them.
    pub fn create<T: Any + fmt::Display>(&mut self, value: T) -> Value<T> {
        let id = self.cells.insert(Cell {
            value: Box::new(value),
            dependents: Vec::new(),
        });
        Value {
            id,
            _marker: PhantomData,
        }
    }

    /// Current value behind `handle`.
    pub fn get<T: Any>(&self, handle: Value<T>) -> GuiResult<&T> {
        self.cells
            .get(handle.id)
            .and_then(|cell| (*cell.value).as_any().downcast_ref::<T>())
            .ok_or(GuiError::ValueType(handle.id))
    }

    /// Widgets registered as dependents of `id`, in registration order.
    pub fn dependents(&self, id: ValueId) -> &[WidgetId] {
        self.cells
            .get(id)
            .map(|cell| cell.dependents.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Replace the stored value and return the dependents to notify.
    pub(crate) fn replace<T: Any + fmt::Display>(
        &mut self,
        handle: Value<T>,
        value: T,
    ) -> GuiResult<Vec<WidgetId>> {
        self.modify(handle, |slot| *slot = value)
    }

    /// Mutate the stored value in place and return the dependents to notify.
    pub(crate) fn modify<T: Any, F: FnOnce(&mut T)>(
        &mut self,
        handle: Value<T>,
        f: F,
    ) -> GuiResult<Vec<WidgetId>> {
        let cell = self
            .cells
            .get_mut(handle.id)
            .ok_or(GuiError::ValueType(handle.id))?;
        let slot = (*cell.value)
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(GuiError::ValueType(handle.id))?;
        f(slot);
        Ok(cell.dependents.clone())
    }

    /// Register `widget` as a dependent of `id`.
    pub(crate) fn subscribe(&mut self, id: ValueId, widget: WidgetId) -> GuiResult<()> {
        let cell = self.cells.get_mut(id).ok_or(GuiError::ValueType(id))?;
        cell.dependents.push(widget);
        Ok(())
    }

    /// Drop `widget` from every dependency list.
    pub(crate) fn unsubscribe(&mut self, widget: WidgetId) {
        for cell in self.cells.values_mut() {
            cell.dependents.retain(|&w| w != widget);
        }
    }

    /// Write the `Display` output of the value `id` into `out`.
    pub(crate) fn write_value<W: fmt::Write>(&self, id: ValueId, out: &mut W) -> GuiResult<()> {
        let cell = self.cells.get(id).ok_or(GuiError::ValueType(id))?;
        write!(out, "{}", Shown(&*cell.value)).map_err(|_| GuiError::ValueType(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use slotmap::SlotMap;

    #[test]
    fn test_get_checks_type() {
        let mut store = ValueStore::new();
        let level = store.create(42i32);
        assert_eq!(*store.get(level).unwrap(), 42);

        let forged: Value<String> = Value {
            id: level.id(),
            _marker: PhantomData,
        };
        assert!(matches!(store.get(forged), Err(GuiError::ValueType(_))));
    }

    #[test]
    fn test_replace_returns_dependents_in_order() {
        let mut ids: SlotMap<WidgetId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());

        let mut store = ValueStore::new();
        let level = store.create(1i32);
        store.subscribe(level.id(), b).unwrap();
        store.subscribe(level.id(), a).unwrap();

        let notified = store.replace(level, 7).unwrap();
        assert_eq!(notified, [b, a]);
        assert_eq!(*store.get(level).unwrap(), 7);

        store.unsubscribe(b);
        assert_eq!(store.dependents(level.id()), [a]);
    }

    #[test]
    fn test_write_value_uses_display() {
        let mut store = ValueStore::new();
        let name = store.create(String::from("Licht"));
        let mut out = String::new();
        store.write_value(name.id(), &mut out).unwrap();
        assert_eq!(out, "Licht");

        store.modify(name, |s| s.push('!')).unwrap();
        out.clear();
        store.write_value(name.id(), &mut out).unwrap();
        assert_eq!(out, "Licht!");
    }
}
