// Editor preferences
// Stored as a camelCase JSON blob under `codenest.editorSettings`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),
    #[error("Unknown settings group: {0}")]
    UnknownGroup(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Failed to parse settings: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ── Enumerated options ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    #[default]
    Line,
    Block,
    Underline,
    LineThin,
    BlockOutline,
    UnderlineThin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorBlinking {
    #[default]
    Blink,
    Smooth,
    Phase,
    Expand,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderWhitespace {
    None,
    Boundary,
    #[default]
    Selection,
    Trailing,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderLineHighlight {
    None,
    Gutter,
    #[default]
    Line,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineNumbers {
    #[default]
    On,
    Off,
    Relative,
    Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimapSide {
    #[default]
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimapSlider {
    Always,
    #[default]
    Mouseover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldingControls {
    Always,
    #[default]
    Mouseover,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollbarVisibility {
    #[default]
    Auto,
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WordWrap {
    #[default]
    Off,
    On,
    WordWrapColumn,
    Bounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoClosing {
    Always,
    #[default]
    LanguageDefined,
    BeforeWhitespace,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoIndent {
    None,
    Keep,
    Brackets,
    #[default]
    Advanced,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultiCursorModifier {
    CtrlCmd,
    #[default]
    Alt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptSuggestionOnEnter {
    #[default]
    On,
    Smart,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetSuggestions {
    Top,
    Bottom,
    #[default]
    Inline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchBrackets {
    #[default]
    Always,
    Near,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedSearchString {
    Never,
    #[default]
    Always,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoFindInSelection {
    #[default]
    Never,
    Always,
    Multiline,
}

// ── Nested groups ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoverSettings {
    pub enabled: bool,
    /// Milliseconds before the hover appears
    pub delay: u32,
    pub sticky: bool,
}

impl Default for HoverSettings {
    fn default() -> Self {
        Self { enabled: true, delay: 300, sticky: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterHintsSettings {
    pub enabled: bool,
    pub cycle: bool,
}

impl Default for ParameterHintsSettings {
    fn default() -> Self {
        Self { enabled: true, cycle: false }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindSettings {
    pub seed_search_string_from_selection: SeedSearchString,
    pub auto_find_in_selection: AutoFindInSelection,
    pub add_extra_space_on_top: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuidesSettings {
    pub indentation: bool,
    pub bracket_pairs: bool,
    pub highlight_active_indentation: bool,
}

impl Default for GuidesSettings {
    fn default() -> Self {
        Self {
            indentation: true,
            bracket_pairs: false,
            highlight_active_indentation: true,
        }
    }
}

// ── EditorSettings ──────────────────────────────────────────────────

/// Every editor preference, flat except for the four nested groups.
///
/// Unknown keys are ignored on load and missing keys take their default, so
/// blobs written by older or newer versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    // Appearance
    pub theme: String,
    pub font_size: u32,
    pub font_family: String,
    pub font_weight: String,
    pub font_ligatures: bool,
    /// 0 = let the widget compute it from the font size
    pub line_height: u32,
    pub letter_spacing: f32,
    pub cursor_style: CursorStyle,
    pub cursor_blinking: CursorBlinking,
    pub cursor_width: u32,
    pub render_whitespace: RenderWhitespace,
    pub render_line_highlight: RenderLineHighlight,
    pub line_numbers: LineNumbers,
    pub minimap_enabled: bool,
    pub minimap_side: MinimapSide,
    pub minimap_scale: u32,
    pub minimap_show_slider: MinimapSlider,
    pub minimap_render_characters: bool,
    pub minimap_max_column: u32,
    pub smooth_scrolling: bool,
    pub rounded_selection: bool,
    pub glyph_margin: bool,
    pub folding: bool,
    pub show_folding_controls: FoldingControls,
    pub scroll_beyond_last_line: bool,
    pub scrollbar_vertical: ScrollbarVisibility,
    pub scrollbar_horizontal: ScrollbarVisibility,
    pub scrollbar_vertical_size: u32,
    pub scrollbar_horizontal_size: u32,
    pub padding_top: u32,
    pub padding_bottom: u32,

    // Editor behaviour
    pub tab_size: u32,
    pub insert_spaces: bool,
    pub detect_indentation: bool,
    pub word_wrap: WordWrap,
    pub word_wrap_column: u32,
    pub auto_closing_brackets: AutoClosing,
    pub auto_closing_quotes: AutoClosing,
    pub auto_indent: AutoIndent,
    pub format_on_paste: bool,
    pub format_on_type: bool,
    pub multi_cursor_modifier: MultiCursorModifier,
    pub drag_and_drop: bool,
    pub mouse_wheel_zoom: bool,
    pub read_only: bool,
    pub auto_save: bool,
    /// Milliseconds
    pub auto_save_delay: u32,

    // Features
    pub quick_suggestions: bool,
    pub quick_suggestions_delay: u32,
    pub suggest_on_trigger_characters: bool,
    pub accept_suggestion_on_enter: AcceptSuggestionOnEnter,
    pub snippet_suggestions: SnippetSuggestions,
    pub word_based_suggestions: bool,
    pub code_lens: bool,
    pub color_decorators: bool,
    pub links: bool,
    pub contextmenu: bool,
    pub match_brackets: MatchBrackets,
    pub selection_highlight: bool,
    pub occurrences_highlight: bool,
    pub bracket_pair_colorization: bool,

    // Nested groups
    pub hover: HoverSettings,
    pub parameter_hints: ParameterHintsSettings,
    pub find: FindSettings,
    pub guides: GuidesSettings,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            // Appearance
            theme: "vs-dark".to_string(),
            font_size: 14,
            font_family: "'Fira Code', Consolas, 'Courier New', monospace".to_string(),
            font_weight: "normal".to_string(),
            font_ligatures: true,
            line_height: 0,
            letter_spacing: 0.0,
            cursor_style: CursorStyle::Line,
            cursor_blinking: CursorBlinking::Blink,
            cursor_width: 2,
            render_whitespace: RenderWhitespace::Selection,
            render_line_highlight: RenderLineHighlight::Line,
            line_numbers: LineNumbers::On,
            minimap_enabled: true,
            minimap_side: MinimapSide::Right,
            minimap_scale: 1,
            minimap_show_slider: MinimapSlider::Mouseover,
            minimap_render_characters: true,
            minimap_max_column: 120,
            smooth_scrolling: true,
            rounded_selection: true,
            glyph_margin: false,
            folding: true,
            show_folding_controls: FoldingControls::Mouseover,
            scroll_beyond_last_line: false,
            scrollbar_vertical: ScrollbarVisibility::Auto,
            scrollbar_horizontal: ScrollbarVisibility::Auto,
            scrollbar_vertical_size: 10,
            scrollbar_horizontal_size: 10,
            padding_top: 8,
            padding_bottom: 8,
            // Editor
            tab_size: 4,
            insert_spaces: true,
            detect_indentation: true,
            word_wrap: WordWrap::Off,
            word_wrap_column: 80,
            auto_closing_brackets: AutoClosing::LanguageDefined,
            auto_closing_quotes: AutoClosing::LanguageDefined,
            auto_indent: AutoIndent::Advanced,
            format_on_paste: false,
            format_on_type: false,
            multi_cursor_modifier: MultiCursorModifier::Alt,
            drag_and_drop: true,
            mouse_wheel_zoom: false,
            read_only: false,
            auto_save: false,
            auto_save_delay: 1000,
            // Features
            quick_suggestions: true,
            quick_suggestions_delay: 10,
            suggest_on_trigger_characters: true,
            accept_suggestion_on_enter: AcceptSuggestionOnEnter::On,
            snippet_suggestions: SnippetSuggestions::Inline,
            word_based_suggestions: true,
            code_lens: true,
            color_decorators: true,
            links: true,
            contextmenu: true,
            match_brackets: MatchBrackets::Always,
            selection_highlight: true,
            occurrences_highlight: true,
            bracket_pair_colorization: true,
            // Nested
            hover: HoverSettings::default(),
            parameter_hints: ParameterHintsSettings::default(),
            find: FindSettings::default(),
            guides: GuidesSettings::default(),
        }
    }
}

/// Keys of the nested groups addressable through `update_nested_setting`.
pub const NESTED_GROUPS: &[&str] = &["hover", "parameterHints", "find", "guides"];

impl EditorSettings {
    /// Parse a stored blob. Unknown keys are dropped, missing keys defaulted.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError::Parse)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(SettingsError::Serialize)
    }

    fn to_map(&self) -> Result<Map<String, Value>, SettingsError> {
        match serde_json::to_value(self).map_err(SettingsError::Serialize)? {
            Value::Object(map) => Ok(map),
            other => Err(SettingsError::InvalidValue {
                key: String::new(),
                message: format!("settings serialized to {}", other),
            }),
        }
    }

    fn from_map(map: Map<String, Value>, key: &str) -> Result<Self, SettingsError> {
        serde_json::from_value(Value::Object(map)).map_err(|e| SettingsError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Replace one top-level field by its JSON key.
    ///
    /// A value that does not fit the field's type is rejected and leaves the
    /// settings untouched.
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut map = self.to_map()?;
        if !map.contains_key(key) {
            return Err(SettingsError::UnknownKey(key.to_string()));
        }
        map.insert(key.to_string(), value);
        *self = Self::from_map(map, key)?;
        Ok(())
    }

    /// Replace one field inside a nested group (e.g. `hover.enabled`).
    pub fn set_nested_value(&mut self, group: &str, key: &str, value: Value) -> Result<(), SettingsError> {
        if !NESTED_GROUPS.contains(&group) {
            return Err(SettingsError::UnknownGroup(group.to_string()));
        }
        let mut map = self.to_map()?;
        let path = format!("{}.{}", group, key);
        match map.get_mut(group) {
            Some(Value::Object(inner)) if inner.contains_key(key) => {
                inner.insert(key.to_string(), value);
            }
            _ => return Err(SettingsError::UnknownKey(path)),
        }
        *self = Self::from_map(map, &path)?;
        Ok(())
    }

    /// Current value of a top-level field by JSON key.
    pub fn get_value(&self, key: &str) -> Result<Value, SettingsError> {
        let mut map = self.to_map()?;
        map.remove(key).ok_or_else(|| SettingsError::UnknownKey(key.to_string()))
    }

    /// Restore the fields of one category from the defaults.
    pub fn reset_category(&mut self, category: SettingsCategory) -> Result<(), SettingsError> {
        let defaults = Self::default().to_map()?;
        let mut map = self.to_map()?;
        for key in category.keys() {
            if let Some(value) = defaults.get(*key) {
                map.insert((*key).to_string(), value.clone());
            }
        }
        *self = Self::from_map(map, category.as_str())?;
        Ok(())
    }
}

// ── Categories ──────────────────────────────────────────────────────

/// Informal partition of the settings keys, used by the settings UI tabs and
/// per-category reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsCategory {
    Appearance,
    Editor,
    Features,
}

const APPEARANCE_KEYS: &[&str] = &[
    "theme",
    "fontSize",
    "fontFamily",
    "fontWeight",
    "fontLigatures",
    "lineHeight",
    "letterSpacing",
    "cursorStyle",
    "cursorBlinking",
    "cursorWidth",
    "renderWhitespace",
    "renderLineHighlight",
    "lineNumbers",
    "minimapEnabled",
    "minimapSide",
    "minimapScale",
    "minimapShowSlider",
    "minimapRenderCharacters",
    "minimapMaxColumn",
    "smoothScrolling",
    "roundedSelection",
    "glyphMargin",
    "folding",
    "showFoldingControls",
    "scrollBeyondLastLine",
    "scrollbarVertical",
    "scrollbarHorizontal",
    "scrollbarVerticalSize",
    "scrollbarHorizontalSize",
    "paddingTop",
    "paddingBottom",
    "guides",
];

const EDITOR_KEYS: &[&str] = &[
    "tabSize",
    "insertSpaces",
    "detectIndentation",
    "wordWrap",
    "wordWrapColumn",
    "autoClosingBrackets",
    "autoClosingQuotes",
    "autoIndent",
    "formatOnPaste",
    "formatOnType",
    "multiCursorModifier",
    "dragAndDrop",
    "mouseWheelZoom",
    "readOnly",
    "autoSave",
    "autoSaveDelay",
];

const FEATURE_KEYS: &[&str] = &[
    "quickSuggestions",
    "quickSuggestionsDelay",
    "suggestOnTriggerCharacters",
    "acceptSuggestionOnEnter",
    "snippetSuggestions",
    "wordBasedSuggestions",
    "codeLens",
    "colorDecorators",
    "links",
    "contextmenu",
    "matchBrackets",
    "selectionHighlight",
    "occurrencesHighlight",
    "bracketPairColorization",
    "hover",
    "parameterHints",
    "find",
];

impl SettingsCategory {
    pub const ALL: [SettingsCategory; 3] = [
        SettingsCategory::Appearance,
        SettingsCategory::Editor,
        SettingsCategory::Features,
    ];

    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            SettingsCategory::Appearance => APPEARANCE_KEYS,
            SettingsCategory::Editor => EDITOR_KEYS,
            SettingsCategory::Features => FEATURE_KEYS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsCategory::Appearance => "appearance",
            SettingsCategory::Editor => "editor",
            SettingsCategory::Features => "features",
        }
    }

    /// Category a key belongs to
    pub fn of_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keys().contains(&key))
    }
}

impl std::str::FromStr for SettingsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "appearance" => Ok(SettingsCategory::Appearance),
            "editor" => Ok(SettingsCategory::Editor),
            "features" => Ok(SettingsCategory::Features),
            other => Err(format!("unknown settings category '{}'", other)),
        }
    }
}
