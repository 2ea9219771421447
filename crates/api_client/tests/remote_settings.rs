//! Account settings sync against a mock backend.

use std::sync::Arc;

use codenest_api_client::{ApiClient, ProfileUpdate, Session};
use codenest_config::{EditorSettings, MemoryStorage, UiLayoutSettings};
use httpmock::prelude::*;
use serde_json::json;

fn signed_in(server: &MockServer) -> ApiClient {
    let storage = Arc::new(MemoryStorage::new());
    let user = serde_json::from_value(json!({
        "id": "u1", "name": "Alice", "email": "alice@example.com"
    }))
    .unwrap();
    Session::new("tok-1", user).save(storage.as_ref()).unwrap();
    ApiClient::new(server.url("/api"), storage).unwrap()
}

#[test]
fn test_fetch_settings_fills_missing_fields_with_defaults() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/settings")
            .header("Authorization", "Bearer tok-1");
        then.status(200).json_body(json!({
            "settings": { "editorSettings": { "fontSize": 20, "theme": "vs" } }
        }));
    });

    let remote = signed_in(&server).fetch_settings().unwrap();
    assert_eq!(remote.editor_settings.font_size, 20);
    assert_eq!(remote.editor_settings.theme, "vs");
    assert_eq!(remote.editor_settings.tab_size, EditorSettings::default().tab_size);
    assert!(remote.ui_settings.is_none());
}

#[test]
fn test_save_settings_sends_both_blobs() {
    let server = MockServer::start();
    let mut editor = EditorSettings::default();
    editor.font_size = 16;
    let echoed = json!({ "settings": { "editorSettings": { "fontSize": 16 } } });
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/api/user/settings");
        then.status(200).json_body(echoed.clone());
    });

    let saved = signed_in(&server)
        .save_settings(&editor, &UiLayoutSettings::default())
        .unwrap();
    mock.assert();
    assert_eq!(saved.editor_settings.font_size, 16);
}

#[test]
fn test_reset_settings() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/user/settings/reset");
        then.status(200).json_body(json!({ "settings": {} }));
    });

    let remote = signed_in(&server).reset_settings().unwrap();
    assert_eq!(remote.editor_settings, EditorSettings::default());
}

#[test]
fn test_update_profile() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/users/profile")
            .json_body(json!({ "bio": "Rustacean" }));
        then.status(200).json_body(json!({
            "user": { "id": "u1", "name": "Alice", "email": "alice@example.com", "bio": "Rustacean" }
        }));
    });

    let user = signed_in(&server)
        .update_profile(&ProfileUpdate { bio: Some("Rustacean".into()), ..Default::default() })
        .unwrap();
    mock.assert();
    assert_eq!(user.bio.as_deref(), Some("Rustacean"));
}

#[test]
fn test_fetch_settings_accepts_bare_shape() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/user/settings");
        then.status(200).json_body(json!({
            "editorSettings": { "fontSize": 20 },
            "uiSettings": { "allowMultiplePanels": true, "outputPanel": { "expanded": true } }
        }));
    });

    let remote = signed_in(&server).fetch_settings().unwrap();
    assert_eq!(remote.editor_settings.font_size, 20);
    let layout = remote.ui_settings.unwrap();
    assert!(layout.allow_multiple_panels);
    assert!(layout.output_panel.expanded);
}

#[test]
fn test_get_user_sends_bearer_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/users/65a1")
            .header("Authorization", "Bearer tok-1");
        then.status(200).json_body(json!({
            "user": { "_id": "65a1", "id": "65a1", "name": "Bob", "email": "bob@example.com" }
        }));
    });

    let user = signed_in(&server).get_user("65a1").unwrap();
    mock.assert();
    assert_eq!(user.id, "65a1");
    assert_eq!(user.name, "Bob");
}

#[test]
fn test_get_user_rejects_path_escaping_ids() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!({}));
    });

    let client = signed_in(&server);
    for id in ["", "../auth/profile", "u1?x=1", "u1/settings"] {
        let err = client.get_user(id).unwrap_err();
        assert!(matches!(err, codenest_api_client::ApiError::InvalidRequest(_)), "{}: {:?}", id, err);
    }
    any.assert_calls(0);
}
