//! CodeNest backend HTTP client.
//!
//! Blocking reqwest client. Auth flows persist the session through the
//! shared [`LocalStorage`]; every authenticated call reads the bearer token
//! from there.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use codenest_config::storage::KEY_TOKEN;
use codenest_config::{EditorSettings, LocalStorage, StorageError, UiLayoutSettings};

use crate::session::{Session, User};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not signed in. Run `codenest login` first.")]
    NotAuthenticated,
    #[error("{0}")]
    Unauthorized(String),
    /// Non-2xx with the server's own message
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Parse(String),
    /// Rejected locally, nothing was sent
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Partial profile edit. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Settings as stored on the account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    #[serde(default)]
    pub editor_settings: EditorSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_settings: Option<UiLayoutSettings>,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

/// Settings responses come either wrapped as `{settings: {...}}` or bare as
/// `{editorSettings, uiSettings}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SettingsEnvelope {
    Wrapped {
        settings: RemoteSettings,
    },
    Bare {
        #[serde(rename = "editorSettings")]
        editor_settings: EditorSettings,
        #[serde(default, rename = "uiSettings")]
        ui_settings: Option<UiLayoutSettings>,
    },
}

impl SettingsEnvelope {
    fn into_settings(self) -> RemoteSettings {
        match self {
            SettingsEnvelope::Wrapped { settings } => settings,
            SettingsEnvelope::Bare { editor_settings, ui_settings } => {
                RemoteSettings { editor_settings, ui_settings }
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetTokenResponse {
    reset_token: String,
}

/// Backend API client (blocking).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    storage: Arc<dyn LocalStorage>,
}

impl ApiClient {
    pub fn new(api_base: impl Into<String>, storage: Arc<dyn LocalStorage>) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("codenest/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        Ok(Self { http, api_base, storage })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// The stored session, if any
    pub fn session(&self) -> Result<Option<Session>, ApiError> {
        Ok(Session::load(self.storage.as_ref())?)
    }

    // ── Auth ────────────────────────────────────────────────────────

    /// Whether an account exists for this email
    pub fn check_email(&self, email: &str) -> Result<bool, ApiError> {
        let json: Value = self.public(Method::POST, "/auth/check-email", &json!({ "email": email }))?;
        Ok(json["exists"].as_bool().unwrap_or(false))
    }

    /// Create an account. The server emails an OTP.
    pub fn register(&self, req: &RegisterRequest) -> Result<String, ApiError> {
        let body = serde_json::to_value(req).map_err(|e| ApiError::Parse(e.to_string()))?;
        let json: Value = self.public(Method::POST, "/auth/register", &body)?;
        Ok(message_of(&json))
    }

    /// Confirm the registration OTP and sign in.
    pub fn verify_otp(&self, email: &str, otp: &str) -> Result<Session, ApiError> {
        let resp: AuthResponse =
            self.public(Method::POST, "/auth/verify-otp", &json!({ "email": email, "otp": otp }))?;
        self.start_session(resp)
    }

    pub fn resend_otp(&self, email: &str) -> Result<String, ApiError> {
        let json: Value = self.public(Method::POST, "/auth/resend-otp", &json!({ "email": email }))?;
        Ok(message_of(&json))
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let resp: AuthResponse = self.public(
            Method::POST,
            "/auth/login",
            &json!({ "email": email, "password": password }),
        )?;
        self.start_session(resp)
    }

    /// Tell the server, then drop the local session whatever it said.
    pub fn logout(&self) -> Result<(), ApiError> {
        if let Some(token) = self.stored_token()? {
            let url = self.url("/auth/logout");
            let sent = self
                .http
                .post(&url)
                .bearer_auth(&token)
                .json(&json!({}))
                .send();
            match sent {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => log::debug!("Logout returned HTTP {}", resp.status().as_u16()),
                Err(e) => log::debug!("Logout request failed: {}", e),
            }
        }
        Session::clear(self.storage.as_ref())?;
        Ok(())
    }

    /// Fetch the signed-in profile and refresh the stored user.
    pub fn get_profile(&self) -> Result<User, ApiError> {
        let env: UserEnvelope = self.authed(Method::GET, "/auth/profile", None)?;
        Session::save_user(self.storage.as_ref(), &env.user)?;
        Ok(env.user)
    }

    pub fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let json: Value = self.public(Method::POST, "/auth/forgot-password", &json!({ "email": email }))?;
        Ok(message_of(&json))
    }

    /// Exchange a reset OTP for a one-time reset token
    pub fn verify_reset_otp(&self, email: &str, otp: &str) -> Result<String, ApiError> {
        let resp: ResetTokenResponse = self.public(
            Method::POST,
            "/auth/verify-reset-otp",
            &json!({ "email": email, "otp": otp }),
        )?;
        Ok(resp.reset_token)
    }

    pub fn reset_password(&self, email: &str, reset_token: &str, new_password: &str) -> Result<String, ApiError> {
        let json: Value = self.public(
            Method::POST,
            "/auth/reset-password",
            &json!({ "email": email, "resetToken": reset_token, "newPassword": new_password }),
        )?;
        Ok(message_of(&json))
    }

    pub fn change_password(&self, current_password: &str, new_password: &str) -> Result<String, ApiError> {
        let body = json!({ "currentPassword": current_password, "newPassword": new_password });
        let json: Value = self.authed(Method::PUT, "/auth/change-password", Some(&body))?;
        Ok(message_of(&json))
    }

    pub fn google_auth_url(&self) -> String {
        self.url("/auth/google")
    }

    pub fn github_auth_url(&self) -> String {
        self.url("/auth/github")
    }

    /// Finish an OAuth redirect: the callback hands back a bare token.
    pub fn complete_social_login(&self, token: &str) -> Result<Session, ApiError> {
        let req = self.http.get(self.url("/auth/profile")).bearer_auth(token);
        let env: UserEnvelope = parse(self.send(req)?)?;
        self.start_session(AuthResponse { token: token.to_string(), user: env.user })
    }

    // ── Users ───────────────────────────────────────────────────────

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Parse(e.to_string()))?;
        let env: UserEnvelope = self.authed(Method::PUT, "/users/profile", Some(&body))?;
        Session::save_user(self.storage.as_ref(), &env.user)?;
        Ok(env.user)
    }

    /// Public profile of another account. The id must be a single path segment.
    pub fn get_user(&self, id: &str) -> Result<User, ApiError> {
        if !is_valid_user_id(id) {
            return Err(ApiError::InvalidRequest(format!("invalid user id '{}'", id)));
        }
        let env: UserEnvelope = self.authed(Method::GET, &format!("/users/{}", id), None)?;
        Ok(env.user)
    }

    // ── Remote settings ─────────────────────────────────────────────

    pub fn fetch_settings(&self) -> Result<RemoteSettings, ApiError> {
        let env: SettingsEnvelope = self.authed(Method::GET, "/user/settings", None)?;
        Ok(env.into_settings())
    }

    pub fn save_settings(&self, editor: &EditorSettings, ui: &UiLayoutSettings) -> Result<RemoteSettings, ApiError> {
        let body = serde_json::to_value(RemoteSettings {
            editor_settings: editor.clone(),
            ui_settings: Some(ui.clone()),
        })
        .map_err(|e| ApiError::Parse(e.to_string()))?;
        let env: SettingsEnvelope = self.authed(Method::PUT, "/user/settings", Some(&body))?;
        Ok(env.into_settings())
    }

    /// Server-side reset; returns the defaults now stored on the account
    pub fn reset_settings(&self) -> Result<RemoteSettings, ApiError> {
        let env: SettingsEnvelope = self.authed(Method::POST, "/user/settings/reset", Some(&json!({})))?;
        Ok(env.into_settings())
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn stored_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.storage.get(KEY_TOKEN)?.filter(|t| !t.is_empty()))
    }

    fn start_session(&self, resp: AuthResponse) -> Result<Session, ApiError> {
        let session = Session::new(resp.token, resp.user);
        session.save(self.storage.as_ref())?;
        log::debug!("Signed in as {}", session.user.email);
        Ok(session)
    }

    fn public<T: DeserializeOwned>(&self, method: Method, path: &str, body: &Value) -> Result<T, ApiError> {
        let req = self.http.request(method, self.url(path)).json(body);
        parse(self.send(req)?)
    }

    /// Bearer-authenticated call. Without a stored token nothing is sent.
    /// A 401 means the token is dead, so the local session is dropped.
    fn authed<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<&Value>) -> Result<T, ApiError> {
        let token = self.stored_token()?.ok_or(ApiError::NotAuthenticated)?;
        let mut req = self.http.request(method, self.url(path)).bearer_auth(&token);
        if let Some(body) = body {
            req = req.json(body);
        }
        match self.send(req) {
            Ok(resp) => parse(resp),
            Err(ApiError::Unauthorized(msg)) => {
                log::warn!("Session rejected by server, signing out locally");
                Session::clear(self.storage.as_ref())?;
                Err(ApiError::Unauthorized(msg))
            }
            Err(e) => Err(e),
        }
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<reqwest::blocking::Response, ApiError> {
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let code = status.as_u16();
        let body = response.text().unwrap_or_default();
        log::debug!("API request failed: HTTP {} {}", code, body);

        let message = server_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        if code == 401 {
            return Err(ApiError::Unauthorized(message));
        }
        Err(ApiError::Server { status: code, message })
    }
}

fn parse<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, ApiError> {
    resp.json().map_err(|e| ApiError::Parse(e.to_string()))
}

/// `message` (or `error`) from a JSON error body, else the trimmed raw body
fn server_message(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error"] {
            if let Some(msg) = json[field].as_str().filter(|m| !m.is_empty()) {
                return Some(msg.to_string());
            }
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Backend ids are ObjectId hex or slug-like; anything else could escape the path
fn is_valid_user_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn message_of(json: &Value) -> String {
    json["message"].as_str().unwrap_or_default().to_string()
}
