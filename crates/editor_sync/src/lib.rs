//! Keeps mounted editor widgets in step with the editor settings store.
//!
//! No widget toolkit concepts here: a widget is anything implementing
//! [`EditorWidget`]. The front-end calls [`SettingsSync::poll`] from its
//! event loop to drive the debounce.

mod registry;
mod sync;

pub use registry::{
    ApplyReport, EditorHandle, EditorRegistry, EditorWidget, WidgetError, DEFAULT_DEBOUNCE,
};
pub use sync::SettingsSync;
