//! Session persistence.
//!
//! The session lives in device storage under three keys: `token`, `user`
//! (JSON blob) and `isAuthenticated`. A front-end reads it synchronously at
//! startup to pick its first route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use codenest_config::storage::{KEY_IS_AUTHENTICATED, KEY_TOKEN, KEY_USER};
use codenest_config::{LocalStorage, StorageError};

/// Account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "UserRecord")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    /// OAuth provider for social accounts ("google", "github")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Wire form of [`User`]. The backend may send `id`, `_id`, or both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    is_verified: bool,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRecord> for User {
    type Error = String;

    fn try_from(raw: UserRecord) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.mongo_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "user record has no id".to_string())?;
        Ok(User {
            id,
            name: raw.name,
            email: raw.email,
            avatar: raw.avatar,
            bio: raw.bio,
            is_verified: raw.is_verified,
            provider: raw.provider,
            created_at: raw.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Where a front-end should land on startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Authenticated,
    Guest,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self { token: token.into(), user }
    }

    /// Read the stored session.
    /// Returns None unless all three keys are present and the user blob parses.
    pub fn load(storage: &dyn LocalStorage) -> Result<Option<Session>, StorageError> {
        if storage.get(KEY_IS_AUTHENTICATED)?.as_deref() != Some("true") {
            return Ok(None);
        }
        let Some(token) = storage.get(KEY_TOKEN)?.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let Some(blob) = storage.get(KEY_USER)? else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&blob) {
            Ok(user) => Ok(Some(Session { token, user })),
            Err(e) => {
                log::warn!("Stored user record is unreadable, treating as signed out: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, storage: &dyn LocalStorage) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&self.user)?;
        storage.set(KEY_TOKEN, &self.token)?;
        storage.set(KEY_USER, &blob)?;
        storage.set(KEY_IS_AUTHENTICATED, "true")
    }

    /// Replace only the stored user record (profile refresh)
    pub fn save_user(storage: &dyn LocalStorage, user: &User) -> Result<(), StorageError> {
        let blob = serde_json::to_string(user)?;
        storage.set(KEY_USER, &blob)
    }

    pub fn clear(storage: &dyn LocalStorage) -> Result<(), StorageError> {
        storage.remove(KEY_TOKEN)?;
        storage.remove(KEY_USER)?;
        storage.remove(KEY_IS_AUTHENTICATED)
    }
}

/// Startup routing decision from the stored session.
/// Storage failures route to the guest screen.
pub fn initial_route(storage: &dyn LocalStorage) -> Route {
    match Session::load(storage) {
        Ok(Some(_)) => Route::Authenticated,
        Ok(None) => Route::Guest,
        Err(e) => {
            log::warn!("Could not read session: {}", e);
            Route::Guest
        }
    }
}
