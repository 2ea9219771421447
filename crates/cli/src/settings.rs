//! `codenest settings` and `codenest layout`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use codenest_config::{
    AppConfig, EditorSettingsStore, Panel, PanelToggleBehavior, SettingsCategory, UiSettingsStore,
};

use crate::{CliError, Context};

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError::io(e.to_string()))?;
    println!("{}", out);
    Ok(())
}

/// JSON if it parses, else the raw text as a string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

// ── Editor settings ─────────────────────────────────────────────────

pub fn cmd_show(ctx: &Context) -> Result<(), CliError> {
    let store = EditorSettingsStore::load(ctx.storage.clone());
    print_json(store.settings())
}

pub fn cmd_options(ctx: &Context) -> Result<(), CliError> {
    let store = EditorSettingsStore::load(ctx.storage.clone());
    print_json(&store.widget_options())
}

pub fn cmd_get(ctx: &Context, key: String) -> Result<(), CliError> {
    let store = EditorSettingsStore::load(ctx.storage.clone());
    let value = store.settings().get_value(&key).map_err(CliError::settings)?;
    print_json(&value)
}

pub fn cmd_set(ctx: &Context, key: String, value: String, group: Option<String>) -> Result<(), CliError> {
    let mut store = EditorSettingsStore::load(ctx.storage.clone());
    let value = parse_value(&value);
    match group {
        Some(group) => store.update_nested_setting(&group, &key, value),
        None => store.update_setting(&key, value),
    }
    .map_err(CliError::settings)?;
    Ok(())
}

pub fn cmd_reset(ctx: &Context, category: Option<SettingsCategory>) -> Result<(), CliError> {
    let mut store = EditorSettingsStore::load(ctx.storage.clone());
    match category {
        Some(category) => store.reset_category(category),
        None => store.reset_to_defaults(),
    }
    .map_err(CliError::settings)?;
    Ok(())
}

pub fn cmd_import(ctx: &Context, file: PathBuf) -> Result<(), CliError> {
    let json = fs::read_to_string(&file)
        .map_err(|e| CliError::usage(format!("Cannot read {}: {}", file.display(), e)))?;
    let mut store = EditorSettingsStore::load(ctx.storage.clone());
    store.import_json(&json).map_err(CliError::settings)
}

pub fn cmd_push(ctx: &Context) -> Result<(), CliError> {
    let editor = EditorSettingsStore::load(ctx.storage.clone());
    let ui = UiSettingsStore::load(ctx.storage.clone());
    ctx.api()?
        .save_settings(editor.settings(), ui.settings())
        .map_err(CliError::api)?;
    eprintln!("Settings uploaded");
    Ok(())
}

pub fn cmd_pull(ctx: &Context) -> Result<(), CliError> {
    let remote = ctx.api()?.fetch_settings().map_err(CliError::api)?;
    let mut editor = EditorSettingsStore::load(ctx.storage.clone());
    editor.replace(remote.editor_settings).map_err(CliError::settings)?;
    if let Some(layout) = remote.ui_settings {
        let mut ui = UiSettingsStore::load(ctx.storage.clone());
        ui.replace(layout).map_err(CliError::settings)?;
    }
    eprintln!("Settings downloaded");
    Ok(())
}

// ── Layout ──────────────────────────────────────────────────────────

fn with_layout<F>(ctx: &Context, op: F) -> Result<(), CliError>
where
    F: FnOnce(&mut UiSettingsStore) -> Result<(), codenest_config::SettingsError>,
{
    let mut store = UiSettingsStore::load(ctx.storage.clone());
    op(&mut store).map_err(CliError::settings)?;
    print_json(store.settings())
}

pub fn cmd_layout_show(ctx: &Context) -> Result<(), CliError> {
    let store = UiSettingsStore::load(ctx.storage.clone());
    print_json(store.settings())
}

pub fn cmd_layout_toggle(ctx: &Context, panel: Panel) -> Result<(), CliError> {
    with_layout(ctx, |s| s.toggle_panel(panel))
}

pub fn cmd_layout_expand(ctx: &Context, panel: Panel, expand: bool) -> Result<(), CliError> {
    with_layout(ctx, |s| if expand { s.expand_panel(panel) } else { s.collapse_panel(panel) })
}

pub fn cmd_layout_allow_multiple(ctx: &Context, allow: bool) -> Result<(), CliError> {
    with_layout(ctx, |s| s.set_allow_multiple_panels(allow))
}

pub fn cmd_layout_footer(ctx: &Context, visible: bool) -> Result<(), CliError> {
    with_layout(ctx, |s| s.set_footer_visible(visible))
}

pub fn cmd_layout_behavior(ctx: &Context, panel: Panel, behavior: String) -> Result<(), CliError> {
    let behavior: PanelToggleBehavior = serde_json::from_value(Value::String(behavior.to_lowercase()))
        .map_err(|_| CliError::usage(format!("unknown toggle behavior '{}'", behavior)).with_hint("use shrink or minimize"))?;
    with_layout(ctx, |s| s.set_toggle_behavior(panel, behavior))
}

pub fn cmd_layout_reset(ctx: &Context) -> Result<(), CliError> {
    with_layout(ctx, |s| s.reset_to_defaults())
}

// ── Config file ─────────────────────────────────────────────────────

pub fn cmd_config_show(ctx: &Context) -> Result<(), CliError> {
    let out = toml::to_string_pretty(&ctx.config).map_err(|e| CliError::io(e.to_string()))?;
    print!("{}", out);
    Ok(())
}

pub fn cmd_config_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::usage(format!("{} already exists", path.display()))
            .with_hint("pass --force to overwrite it"));
    }
    AppConfig::default().save_to(path).map_err(CliError::config)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}
