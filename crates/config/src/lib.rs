// Configuration: editor settings, UI layout, local storage, app config

pub mod app_config;
pub mod editor_settings;
pub mod editor_store;
pub mod secrets;
pub mod storage;
pub mod ui_settings;
pub mod widget_options;

pub use app_config::{AppConfig, ConfigError, JudgeConfig};
pub use editor_settings::{EditorSettings, SettingsCategory, SettingsError};
pub use editor_store::EditorSettingsStore;
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};
pub use ui_settings::{Panel, PanelToggleBehavior, UiLayoutSettings, UiSettingsStore};
pub use widget_options::to_widget_options;
