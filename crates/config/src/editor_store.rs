// Editor settings store
// Single source of truth for editor preferences. Every mutation persists the
// blob and bumps the generation counter that the editor registry watches.

use std::sync::Arc;

use serde_json::Value;

use crate::editor_settings::{EditorSettings, SettingsCategory, SettingsError};
use crate::storage::{LocalStorage, KEY_EDITOR_SETTINGS};
use crate::widget_options::to_widget_options;

pub struct EditorSettingsStore {
    storage: Arc<dyn LocalStorage>,
    settings: EditorSettings,
    generation: u64,
}

impl EditorSettingsStore {
    /// Load from storage, falling back to defaults
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let settings = match storage.get(KEY_EDITOR_SETTINGS) {
            Ok(Some(blob)) => EditorSettings::from_json(&blob).unwrap_or_else(|e| {
                log::warn!("Discarding stored editor settings: {}", e);
                EditorSettings::default()
            }),
            Ok(None) => EditorSettings::default(),
            Err(e) => {
                log::warn!("Error reading editor settings: {}", e);
                EditorSettings::default()
            }
        };

        Self { storage, settings, generation: 0 }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Incremented on every successful mutation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Widget option object for the current settings
    pub fn widget_options(&self) -> Value {
        to_widget_options(&self.settings)
    }

    pub fn update_setting(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut next = self.settings.clone();
        next.set_value(key, value)?;
        self.commit(next)
    }

    pub fn update_nested_setting(&mut self, group: &str, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut next = self.settings.clone();
        next.set_nested_value(group, key, value)?;
        self.commit(next)
    }

    /// Typed update through a closure
    pub fn update<F>(&mut self, op: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut EditorSettings),
    {
        let mut next = self.settings.clone();
        op(&mut next);
        self.commit(next)
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), SettingsError> {
        self.commit(EditorSettings::default())
    }

    pub fn reset_category(&mut self, category: SettingsCategory) -> Result<(), SettingsError> {
        let mut next = self.settings.clone();
        next.reset_category(category)?;
        self.commit(next)
    }

    /// Pretty JSON suitable for a settings export file
    pub fn export_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(&self.settings).map_err(SettingsError::Serialize)
    }

    /// Replace everything from an exported blob
    pub fn import_json(&mut self, json: &str) -> Result<(), SettingsError> {
        let next = EditorSettings::from_json(json)?;
        self.commit(next)
    }

    /// Replace everything with settings fetched from elsewhere (e.g. the backend)
    pub fn replace(&mut self, settings: EditorSettings) -> Result<(), SettingsError> {
        self.commit(settings)
    }

    fn commit(&mut self, next: EditorSettings) -> Result<(), SettingsError> {
        let blob = next.to_json()?;
        self.storage.set(KEY_EDITOR_SETTINGS, &blob)?;
        self.settings = next;
        self.generation += 1;
        Ok(())
    }
}
