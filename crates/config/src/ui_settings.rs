// UI layout settings
// Panel visibility for the code editor page, stored under `codenest.uiSettings`

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::editor_settings::SettingsError;
use crate::storage::{LocalStorage, KEY_UI_SETTINGS};

/// What happens to a panel when it is collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelToggleBehavior {
    /// Panel shrinks to its header
    #[default]
    Shrink,
    /// Panel is minimized into the footer
    Minimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Input,
    Output,
}

impl Panel {
    pub fn other(self) -> Panel {
        match self {
            Panel::Input => Panel::Output,
            Panel::Output => Panel::Input,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Input => "input",
            Panel::Output => "output",
        }
    }
}

impl std::str::FromStr for Panel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "input" | "stdin" => Ok(Panel::Input),
            "output" | "stdout" => Ok(Panel::Output),
            other => Err(format!("unknown panel '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelState {
    pub expanded: bool,
    pub toggle_behavior: PanelToggleBehavior,
}

impl Default for PanelState {
    fn default() -> Self {
        Self { expanded: false, toggle_behavior: PanelToggleBehavior::Shrink }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiLayoutSettings {
    pub footer_visible: bool,
    pub allow_multiple_panels: bool,
    pub input_panel: PanelState,
    pub output_panel: PanelState,
}

impl Default for UiLayoutSettings {
    fn default() -> Self {
        Self {
            footer_visible: true,
            allow_multiple_panels: false,
            input_panel: PanelState::default(),
            output_panel: PanelState { expanded: true, ..PanelState::default() },
        }
    }
}

impl UiLayoutSettings {
    pub fn panel(&self, panel: Panel) -> &PanelState {
        match panel {
            Panel::Input => &self.input_panel,
            Panel::Output => &self.output_panel,
        }
    }

    fn panel_mut(&mut self, panel: Panel) -> &mut PanelState {
        match panel {
            Panel::Input => &mut self.input_panel,
            Panel::Output => &mut self.output_panel,
        }
    }

    pub fn is_expanded(&self, panel: Panel) -> bool {
        self.panel(panel).expanded
    }

    /// Expand a panel. With multiple panels disallowed the other one collapses.
    /// All panel transitions go through here or `collapse`.
    pub fn expand(&mut self, panel: Panel) {
        self.panel_mut(panel).expanded = true;
        if !self.allow_multiple_panels {
            self.panel_mut(panel.other()).expanded = false;
        }
    }

    pub fn collapse(&mut self, panel: Panel) {
        self.panel_mut(panel).expanded = false;
    }

    pub fn toggle(&mut self, panel: Panel) {
        if self.is_expanded(panel) {
            self.collapse(panel);
        } else {
            self.expand(panel);
        }
    }

    /// Disallowing multiple panels while both are open keeps the output panel.
    pub fn set_allow_multiple_panels(&mut self, allow: bool) {
        self.allow_multiple_panels = allow;
        if !allow && self.input_panel.expanded && self.output_panel.expanded {
            self.expand(Panel::Output);
        }
    }
}

pub struct UiSettingsStore {
    storage: Arc<dyn LocalStorage>,
    settings: UiLayoutSettings,
}

impl UiSettingsStore {
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let settings = match storage.get(KEY_UI_SETTINGS) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                log::warn!("Discarding stored UI settings: {}", e);
                UiLayoutSettings::default()
            }),
            Ok(None) => UiLayoutSettings::default(),
            Err(e) => {
                log::warn!("Error reading UI settings: {}", e);
                UiLayoutSettings::default()
            }
        };
        Self { storage, settings }
    }

    pub fn settings(&self) -> &UiLayoutSettings {
        &self.settings
    }

    pub fn set_footer_visible(&mut self, visible: bool) -> Result<(), SettingsError> {
        self.update(|s| s.footer_visible = visible)
    }

    pub fn set_allow_multiple_panels(&mut self, allow: bool) -> Result<(), SettingsError> {
        self.update(|s| s.set_allow_multiple_panels(allow))
    }

    pub fn set_toggle_behavior(&mut self, panel: Panel, behavior: PanelToggleBehavior) -> Result<(), SettingsError> {
        self.update(|s| s.panel_mut(panel).toggle_behavior = behavior)
    }

    pub fn toggle_panel(&mut self, panel: Panel) -> Result<(), SettingsError> {
        self.update(|s| s.toggle(panel))
    }

    pub fn expand_panel(&mut self, panel: Panel) -> Result<(), SettingsError> {
        self.update(|s| s.expand(panel))
    }

    pub fn collapse_panel(&mut self, panel: Panel) -> Result<(), SettingsError> {
        self.update(|s| s.collapse(panel))
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), SettingsError> {
        self.update(|s| *s = UiLayoutSettings::default())
    }

    /// Replace everything (e.g. with settings pulled from the backend)
    pub fn replace(&mut self, settings: UiLayoutSettings) -> Result<(), SettingsError> {
        self.update(|s| *s = settings)
    }

    fn update<F>(&mut self, op: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut UiLayoutSettings),
    {
        let mut next = self.settings.clone();
        op(&mut next);
        let blob = serde_json::to_string(&next).map_err(SettingsError::Serialize)?;
        self.storage.set(KEY_UI_SETTINGS, &blob)?;
        self.settings = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_expanding_one_collapses_other() {
        let mut layout = UiLayoutSettings::default();
        assert!(layout.is_expanded(Panel::Output));
        layout.toggle(Panel::Input);
        assert!(layout.is_expanded(Panel::Input));
        assert!(!layout.is_expanded(Panel::Output));
        layout.expand(Panel::Output);
        assert!(!layout.is_expanded(Panel::Input));
    }

    #[test]
    fn test_multiple_panels_allowed() {
        let mut layout = UiLayoutSettings::default();
        layout.set_allow_multiple_panels(true);
        layout.expand(Panel::Input);
        assert!(layout.is_expanded(Panel::Input));
        assert!(layout.is_expanded(Panel::Output));

        // Turning it off resolves the conflict in favour of output
        layout.set_allow_multiple_panels(false);
        assert!(!layout.is_expanded(Panel::Input));
        assert!(layout.is_expanded(Panel::Output));
    }

    #[test]
    fn test_collapse_leaves_other_alone() {
        let mut layout = UiLayoutSettings::default();
        layout.collapse(Panel::Output);
        assert!(!layout.is_expanded(Panel::Output));
        assert!(!layout.is_expanded(Panel::Input));
    }

    #[test]
    fn test_store_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = UiSettingsStore::load(storage.clone());
        store.set_footer_visible(false).unwrap();
        store.set_toggle_behavior(Panel::Input, PanelToggleBehavior::Minimize).unwrap();
        store.toggle_panel(Panel::Input).unwrap();

        let reloaded = UiSettingsStore::load(storage);
        let s = reloaded.settings();
        assert!(!s.footer_visible);
        assert_eq!(s.input_panel.toggle_behavior, PanelToggleBehavior::Minimize);
        assert!(s.input_panel.expanded);
        assert!(!s.output_panel.expanded);
    }

    #[test]
    fn test_stored_layout_json_shape() {
        let json = serde_json::to_value(UiLayoutSettings::default()).unwrap();
        assert_eq!(json["footerVisible"], true);
        assert_eq!(json["allowMultiplePanels"], false);
        assert_eq!(json["outputPanel"]["toggleBehavior"], "shrink");
    }

    #[test]
    fn test_panel_parse() {
        assert_eq!("Input".parse::<Panel>().unwrap(), Panel::Input);
        assert_eq!("stdout".parse::<Panel>().unwrap(), Panel::Output);
        assert!("sidebar".parse::<Panel>().is_err());
    }
}
