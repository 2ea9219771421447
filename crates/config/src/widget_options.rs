//! Mapping from [`EditorSettings`] to the editor widget's option object.
//!
//! Most fields pass through under their camelCase name. The widget groups a
//! few of them differently, so the flat `minimap*`, `scrollbar*` and
//! `padding*` fields are folded into sub-objects, and `quickSuggestions` and
//! `bracketPairColorization` expand into the object form the widget expects.
//!
//! Store-only preferences (`autoSave`, `autoSaveDelay`) never reach the widget.

use serde_json::{json, Map, Value};

use crate::editor_settings::EditorSettings;

/// Build the widget option object. Pure: the same settings always produce the
/// same value.
pub fn to_widget_options(s: &EditorSettings) -> Value {
    let mut options = Map::new();
    let mut put = |key: &str, value: Value| {
        options.insert(key.to_string(), value);
    };

    // Appearance
    put("theme", json!(s.theme));
    put("fontSize", json!(s.font_size));
    put("fontFamily", json!(s.font_family));
    put("fontWeight", json!(s.font_weight));
    put("fontLigatures", json!(s.font_ligatures));
    if s.line_height > 0 {
        put("lineHeight", json!(s.line_height));
    }
    put("letterSpacing", json!(s.letter_spacing));
    put("cursorStyle", json!(s.cursor_style));
    put("cursorBlinking", json!(s.cursor_blinking));
    put("cursorWidth", json!(s.cursor_width));
    put("renderWhitespace", json!(s.render_whitespace));
    put("renderLineHighlight", json!(s.render_line_highlight));
    put("lineNumbers", json!(s.line_numbers));
    put("minimap", json!({
        "enabled": s.minimap_enabled,
        "side": s.minimap_side,
        "scale": s.minimap_scale,
        "showSlider": s.minimap_show_slider,
        "renderCharacters": s.minimap_render_characters,
        "maxColumn": s.minimap_max_column,
    }));
    put("smoothScrolling", json!(s.smooth_scrolling));
    put("roundedSelection", json!(s.rounded_selection));
    put("glyphMargin", json!(s.glyph_margin));
    put("folding", json!(s.folding));
    put("showFoldingControls", json!(s.show_folding_controls));
    put("scrollBeyondLastLine", json!(s.scroll_beyond_last_line));
    put("scrollbar", json!({
        "vertical": s.scrollbar_vertical,
        "horizontal": s.scrollbar_horizontal,
        "verticalScrollbarSize": s.scrollbar_vertical_size,
        "horizontalScrollbarSize": s.scrollbar_horizontal_size,
    }));
    put("padding", json!({
        "top": s.padding_top,
        "bottom": s.padding_bottom,
    }));
    put("guides", json!({
        "indentation": s.guides.indentation,
        "bracketPairs": s.guides.bracket_pairs,
        "highlightActiveIndentation": s.guides.highlight_active_indentation,
    }));

    // Editor
    put("tabSize", json!(s.tab_size));
    put("insertSpaces", json!(s.insert_spaces));
    put("detectIndentation", json!(s.detect_indentation));
    put("wordWrap", json!(s.word_wrap));
    put("wordWrapColumn", json!(s.word_wrap_column));
    put("autoClosingBrackets", json!(s.auto_closing_brackets));
    put("autoClosingQuotes", json!(s.auto_closing_quotes));
    put("autoIndent", json!(s.auto_indent));
    put("formatOnPaste", json!(s.format_on_paste));
    put("formatOnType", json!(s.format_on_type));
    put("multiCursorModifier", json!(s.multi_cursor_modifier));
    put("dragAndDrop", json!(s.drag_and_drop));
    put("mouseWheelZoom", json!(s.mouse_wheel_zoom));
    put("readOnly", json!(s.read_only));

    // Features
    put("quickSuggestions", json!({
        "other": s.quick_suggestions,
        "comments": false,
        "strings": false,
    }));
    put("quickSuggestionsDelay", json!(s.quick_suggestions_delay));
    put("suggestOnTriggerCharacters", json!(s.suggest_on_trigger_characters));
    put("acceptSuggestionOnEnter", json!(s.accept_suggestion_on_enter));
    put("snippetSuggestions", json!(s.snippet_suggestions));
    put("wordBasedSuggestions", json!(s.word_based_suggestions));
    put("codeLens", json!(s.code_lens));
    put("colorDecorators", json!(s.color_decorators));
    put("links", json!(s.links));
    put("contextmenu", json!(s.contextmenu));
    put("matchBrackets", json!(s.match_brackets));
    put("selectionHighlight", json!(s.selection_highlight));
    put("occurrencesHighlight", json!(s.occurrences_highlight));
    put("bracketPairColorization", json!({ "enabled": s.bracket_pair_colorization }));
    put("hover", json!({
        "enabled": s.hover.enabled,
        "delay": s.hover.delay,
        "sticky": s.hover.sticky,
    }));
    put("parameterHints", json!({
        "enabled": s.parameter_hints.enabled,
        "cycle": s.parameter_hints.cycle,
    }));
    put("find", json!({
        "seedSearchStringFromSelection": s.find.seed_search_string_from_selection,
        "autoFindInSelection": s.find.auto_find_in_selection,
        "addExtraSpaceOnTop": s.find.add_extra_space_on_top,
    }));

    Value::Object(options)
}
