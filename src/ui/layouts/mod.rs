//! Containers that allocate windows to their children

pub mod frame;
pub mod menu;

pub use frame::{Frame, partition};
pub use menu::{HeaderPosition, Menu, Page, PageChangeCallback, PageStyle};
