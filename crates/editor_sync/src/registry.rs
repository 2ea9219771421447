//! Registry of mounted editor widgets.
//!
//! Settings changes are debounced: each change restarts the window and
//! replaces whatever was pending, so only the most recent options are ever
//! applied. A flush pushes the options to every registered widget. Widgets
//! that fail are dropped from the registry and reported, never raised.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;

/// Default debounce window for settings propagation
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("editor widget has been disposed")]
    Disposed,
    #[error("editor widget rejected options: {0}")]
    Rejected(String),
}

/// Capability implemented by a widget adapter.
pub trait EditorWidget {
    fn apply_options(&self, options: &Value) -> Result<(), WidgetError>;
}

/// Shared reference to a mounted widget. Identity is the allocation, so two
/// clones of the same handle are the same registry entry.
#[derive(Clone)]
pub struct EditorHandle(Arc<dyn EditorWidget>);

impl EditorHandle {
    pub fn new<W: EditorWidget + 'static>(widget: W) -> Self {
        Self(Arc::new(widget))
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }

    fn apply(&self, options: &Value) -> Result<(), WidgetError> {
        self.0.apply_options(options)
    }
}

impl PartialEq for EditorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for EditorHandle {}

impl Hash for EditorHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EditorHandle({:p})", self.addr())
    }
}

/// Outcome of pushing options to the registered widgets
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub applied: usize,
    pub evicted: Vec<(EditorHandle, WidgetError)>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.evicted.is_empty()
    }
}

struct Pending {
    options: Value,
    since: Instant,
}

pub struct EditorRegistry {
    editors: HashSet<EditorHandle>,
    /// Options most recently pushed to the widgets
    current: Option<Value>,
    pending: Option<Pending>,
    debounce: Duration,
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl EditorRegistry {
    pub fn new(debounce: Duration) -> Self {
        Self {
            editors: HashSet::new(),
            current: None,
            pending: None,
            debounce,
        }
    }

    /// Registry that already knows the options new widgets should start with
    pub fn with_options(debounce: Duration, options: Value) -> Self {
        let mut registry = Self::new(debounce);
        registry.current = Some(options);
        registry
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    pub fn contains(&self, handle: &EditorHandle) -> bool {
        self.editors.contains(handle)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Newest known options, pending or applied
    pub fn latest_options(&self) -> Option<&Value> {
        self.pending
            .as_ref()
            .map(|p| &p.options)
            .or(self.current.as_ref())
    }

    /// Add a widget on mount. `None` (a widget that never mounted) is ignored.
    ///
    /// The widget immediately receives the newest known options; if that
    /// fails it is not registered. Returns true when the handle is in the
    /// registry afterwards.
    pub fn register_editor(&mut self, handle: Option<EditorHandle>) -> bool {
        let Some(handle) = handle else {
            return false;
        };
        if self.editors.contains(&handle) {
            return true;
        }
        if let Some(options) = self.latest_options() {
            if let Err(e) = handle.apply(options) {
                log::warn!("Not registering {:?}: {}", handle, e);
                return false;
            }
        }
        self.editors.insert(handle);
        true
    }

    /// Remove a widget on unmount. Returns whether it was registered.
    pub fn unregister_editor(&mut self, handle: &EditorHandle) -> bool {
        self.editors.remove(handle)
    }

    /// Record new options and restart the debounce window
    pub fn settings_changed(&mut self, options: Value) {
        self.settings_changed_at(options, Instant::now());
    }

    pub fn settings_changed_at(&mut self, options: Value, now: Instant) {
        self.pending = Some(Pending { options, since: now });
    }

    /// Flush pending options once the debounce window has elapsed
    pub fn poll(&mut self) -> Option<ApplyReport> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<ApplyReport> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.since) >= self.debounce);
        if due {
            self.flush_now()
        } else {
            None
        }
    }

    /// Flush pending options regardless of the window (e.g. before teardown)
    pub fn flush_now(&mut self) -> Option<ApplyReport> {
        let pending = self.pending.take()?;
        let report = self.apply_all(&pending.options);
        self.current = Some(pending.options);
        Some(report)
    }

    fn apply_all(&mut self, options: &Value) -> ApplyReport {
        let mut report = ApplyReport::default();
        for handle in &self.editors {
            match handle.apply(options) {
                Ok(()) => report.applied += 1,
                Err(e) => report.evicted.push((handle.clone(), e)),
            }
        }
        for (handle, e) in &report.evicted {
            log::warn!("Dropping {:?} from editor registry: {}", handle, e);
            self.editors.remove(handle);
        }
        log::debug!(
            "Applied editor options to {} widget(s), evicted {}",
            report.applied,
            report.evicted.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeWidget {
        received: RefCell<Vec<Value>>,
        disposed: Cell<bool>,
    }

    impl EditorWidget for Rc<FakeWidget> {
        fn apply_options(&self, options: &Value) -> Result<(), WidgetError> {
            if self.disposed.get() {
                return Err(WidgetError::Disposed);
            }
            self.received.borrow_mut().push(options.clone());
            Ok(())
        }
    }

    fn widget() -> (Rc<FakeWidget>, EditorHandle) {
        let w = Rc::new(FakeWidget::default());
        let handle = EditorHandle::new(w.clone());
        (w, handle)
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = EditorRegistry::default();
        let (_, handle) = widget();
        assert!(registry.register_editor(Some(handle.clone())));
        assert!(registry.register_editor(Some(handle.clone())));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&handle));
    }

    #[test]
    fn test_register_none_is_noop() {
        let mut registry = EditorRegistry::default();
        assert!(!registry.register_editor(None));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let mut registry = EditorRegistry::default();
        let (_, handle) = widget();
        assert!(!registry.unregister_editor(&handle));
        registry.register_editor(Some(handle.clone()));
        assert!(registry.unregister_editor(&handle));
        assert!(!registry.unregister_editor(&handle));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_applies_known_options() {
        let mut registry = EditorRegistry::with_options(DEFAULT_DEBOUNCE, json!({"fontSize": 14}));
        let (w, handle) = widget();
        registry.register_editor(Some(handle));
        assert_eq!(w.received.borrow().as_slice(), &[json!({"fontSize": 14})]);
    }

    #[test]
    fn test_disposed_widget_is_not_registered() {
        let mut registry = EditorRegistry::with_options(DEFAULT_DEBOUNCE, json!({}));
        let (w, handle) = widget();
        w.disposed.set(true);
        assert!(!registry.register_editor(Some(handle)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_debounce_last_write_wins() {
        let mut registry = EditorRegistry::new(Duration::from_millis(100));
        let (w, handle) = widget();
        registry.register_editor(Some(handle));

        let t0 = Instant::now();
        registry.settings_changed_at(json!({"fontSize": 15}), t0);
        registry.settings_changed_at(json!({"fontSize": 16}), t0 + Duration::from_millis(60));

        // Window restarted by the second change
        assert!(registry.poll_at(t0 + Duration::from_millis(120)).is_none());
        assert!(w.received.borrow().is_empty());

        let report = registry.poll_at(t0 + Duration::from_millis(160)).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(w.received.borrow().as_slice(), &[json!({"fontSize": 16})]);

        // Nothing left to flush
        assert!(registry.poll_at(t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_failing_widget_is_evicted() {
        let mut registry = EditorRegistry::default();
        let (good, good_handle) = widget();
        let (stale, stale_handle) = widget();
        registry.register_editor(Some(good_handle));
        registry.register_editor(Some(stale_handle.clone()));
        stale.disposed.set(true);

        registry.settings_changed(json!({"tabSize": 2}));
        let report = registry.flush_now().unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.evicted.len(), 1);
        assert_eq!(report.evicted[0].0, stale_handle);
        assert_eq!(report.evicted[0].1, WidgetError::Disposed);
        assert!(!registry.contains(&stale_handle));
        assert_eq!(registry.len(), 1);
        assert_eq!(good.received.borrow().len(), 1);
    }

    #[test]
    fn test_late_registration_gets_pending_options() {
        let mut registry = EditorRegistry::default();
        registry.settings_changed(json!({"wordWrap": "on"}));
        let (w, handle) = widget();
        registry.register_editor(Some(handle));
        assert_eq!(w.received.borrow().as_slice(), &[json!({"wordWrap": "on"})]);
    }
}
