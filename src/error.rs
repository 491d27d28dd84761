//! Error types for the widget tree, layout and touch routing

use alloc::string::String;
use thiserror_no_std::Error;

use crate::ui::core::{WidgetId, Window};
use crate::value::ValueId;

/// Broad classification of a [`GuiError`].
///
/// Configuration and routing errors both abort the current draw/touch cycle;
/// the distinction matters for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The widget tree is malformed (missing pages, zero weights, bad sides).
    Configuration,
    /// A touch coordinate and the layout disagree.
    Routing,
    /// The draw target reported a failure.
    Display,
}

/// Errors raised while building, drawing or routing touches through the tree
#[derive(Debug, Error)]
pub enum GuiError {
    /// The screen has no root widget to draw or hit-test
    #[error("No root widget has been set")]
    NoRoot,

    /// A widget handle does not refer to a live widget
    #[error("Unknown widget {0:?}")]
    UnknownWidget(WidgetId),

    /// Children were packed into a widget that cannot hold them
    #[error("Widget {0:?} cannot hold children")]
    NotAContainer(WidgetId),

    /// A menu operation was requested on a widget that is not a menu
    #[error("Widget {0:?} is not a menu")]
    NotAMenu(WidgetId),

    /// The child is already owned by another container
    #[error("Widget {child:?} already has a parent")]
    AlreadyPacked {
        /// The child that was packed twice
        child: WidgetId,
    },

    /// Packing would make a widget its own ancestor
    #[error("Packing {child:?} into {parent:?} would create a cycle")]
    Cycle {
        /// The intended parent
        parent: WidgetId,
        /// The intended child
        child: WidgetId,
    },

    /// A menu was drawn or hit-tested before any page was added
    #[error("Menu {0:?} has no pages")]
    NoPages(WidgetId),

    /// No page with the requested title exists
    #[error("Menu {menu:?} has no page titled '{title}'")]
    PageNotFound {
        /// The menu that was searched
        menu: WidgetId,
        /// The requested title
        title: String,
    },

    /// A page index outside the menu's page list
    #[error("Page index {index} out of range ({count} pages)")]
    PageIndex {
        /// Requested index
        index: usize,
        /// Number of pages in the menu
        count: usize,
    },

    /// A non-empty frame whose weights sum to zero
    #[error("Frame {0:?} has a zero total weight")]
    ZeroWeight(WidgetId),

    /// A numeric layout side other than 0 or 1
    #[error("Unsupported side {0}")]
    UnsupportedSide(u8),

    /// A value handle is stale or was read as the wrong type
    #[error("Value {0:?} is missing or holds another type")]
    ValueType(ValueId),

    /// A touch fell outside the window a container believes it owns
    #[error("Touch at ({x}, {y}) outside window {window:?} of {widget:?}")]
    OutsideWindow {
        /// The container that rejected the point
        widget: WidgetId,
        /// Touch x coordinate
        x: i32,
        /// Touch y coordinate
        y: i32,
        /// The window handed to the container
        window: Window,
    },

    /// The underlying draw target failed
    #[error("Display draw failed")]
    Display,

    /// A configuration blob could not be decoded or encoded
    #[error("Invalid configuration blob")]
    Config,
}

impl GuiError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuiError::OutsideWindow { .. } => ErrorKind::Routing,
            GuiError::Display => ErrorKind::Display,
            GuiError::NoRoot
            | GuiError::UnknownWidget(_)
            | GuiError::NotAContainer(_)
            | GuiError::NotAMenu(_)
            | GuiError::AlreadyPacked { .. }
            | GuiError::Cycle { .. }
            | GuiError::NoPages(_)
            | GuiError::PageNotFound { .. }
            | GuiError::PageIndex { .. }
            | GuiError::ZeroWeight(_)
            | GuiError::UnsupportedSide(_)
            | GuiError::ValueType(_)
            | GuiError::Config => ErrorKind::Configuration,
        }
    }
}

/// Result type for toolkit operations
pub type GuiResult<T> = Result<T, GuiError>;
