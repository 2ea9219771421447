//! Glue between the editor settings store and the widget registry.
//!
//! Every store mutation made through [`SettingsSync`] schedules a debounced
//! push of the freshly mapped widget options. The store's generation counter
//! decides whether anything changed, so a failed or no-op update never
//! schedules a flush.

use std::time::{Duration, Instant};

use serde_json::Value;

use codenest_config::{EditorSettings, EditorSettingsStore, SettingsCategory, SettingsError};

use crate::registry::{ApplyReport, EditorHandle, EditorRegistry};

pub struct SettingsSync {
    store: EditorSettingsStore,
    registry: EditorRegistry,
    seen_generation: u64,
}

impl SettingsSync {
    pub fn new(store: EditorSettingsStore, debounce: Duration) -> Self {
        let registry = EditorRegistry::with_options(debounce, store.widget_options());
        let seen_generation = store.generation();
        Self { store, registry, seen_generation }
    }

    pub fn store(&self) -> &EditorSettingsStore {
        &self.store
    }

    pub fn settings(&self) -> &EditorSettings {
        self.store.settings()
    }

    pub fn registry(&self) -> &EditorRegistry {
        &self.registry
    }

    pub fn update_setting(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let result = self.store.update_setting(key, value);
        self.observe();
        result
    }

    pub fn update_nested_setting(&mut self, group: &str, key: &str, value: Value) -> Result<(), SettingsError> {
        let result = self.store.update_nested_setting(group, key, value);
        self.observe();
        result
    }

    pub fn update<F>(&mut self, op: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut EditorSettings),
    {
        let result = self.store.update(op);
        self.observe();
        result
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), SettingsError> {
        let result = self.store.reset_to_defaults();
        self.observe();
        result
    }

    pub fn reset_category(&mut self, category: SettingsCategory) -> Result<(), SettingsError> {
        let result = self.store.reset_category(category);
        self.observe();
        result
    }

    pub fn replace(&mut self, settings: EditorSettings) -> Result<(), SettingsError> {
        let result = self.store.replace(settings);
        self.observe();
        result
    }

    pub fn register_editor(&mut self, handle: Option<EditorHandle>) -> bool {
        self.registry.register_editor(handle)
    }

    pub fn unregister_editor(&mut self, handle: &EditorHandle) -> bool {
        self.registry.unregister_editor(handle)
    }

    pub fn poll(&mut self) -> Option<ApplyReport> {
        self.registry.poll()
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<ApplyReport> {
        self.registry.poll_at(now)
    }

    pub fn flush_now(&mut self) -> Option<ApplyReport> {
        self.registry.flush_now()
    }

    fn observe(&mut self) {
        let generation = self.store.generation();
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.registry.settings_changed(self.store.widget_options());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EditorWidget, WidgetError, DEFAULT_DEBOUNCE};
    use codenest_config::{to_widget_options, MemoryStorage};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Value>>);

    impl EditorWidget for Rc<Recorder> {
        fn apply_options(&self, options: &Value) -> Result<(), WidgetError> {
            self.0.borrow_mut().push(options.clone());
            Ok(())
        }
    }

    fn sync() -> SettingsSync {
        let store = EditorSettingsStore::load(Arc::new(MemoryStorage::new()));
        SettingsSync::new(store, DEFAULT_DEBOUNCE)
    }

    #[test]
    fn test_update_reaches_registered_editors() {
        let mut sync = sync();
        let recorder = Rc::new(Recorder::default());
        sync.register_editor(Some(EditorHandle::new(recorder.clone())));
        // Initial options on mount
        assert_eq!(recorder.0.borrow().len(), 1);

        sync.update_setting("fontSize", json!(18)).unwrap();
        sync.update_nested_setting("hover", "enabled", json!(false)).unwrap();
        assert_eq!(recorder.0.borrow().len(), 1);

        let report = sync.poll_at(Instant::now() + DEFAULT_DEBOUNCE).unwrap();
        assert!(report.is_clean());

        let received = recorder.0.borrow();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1]["fontSize"], 18);
        assert_eq!(received[1]["hover"]["enabled"], false);
    }

    #[test]
    fn test_failed_update_schedules_nothing() {
        let mut sync = sync();
        assert!(sync.update_setting("fontSize", json!("big")).is_err());
        assert!(!sync.registry().has_pending());
    }

    #[test]
    fn test_reset_pushes_default_mapping() {
        let mut sync = sync();
        sync.update(|s| s.tab_size = 8).unwrap();
        sync.flush_now();

        let recorder = Rc::new(Recorder::default());
        sync.register_editor(Some(EditorHandle::new(recorder.clone())));
        sync.reset_to_defaults().unwrap();
        sync.flush_now();

        let received = recorder.0.borrow();
        assert_eq!(received.last().unwrap(), &to_widget_options(&EditorSettings::default()));
    }
}
