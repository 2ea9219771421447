//! CodeNest backend client.
//!
//! Auth (email + OTP, password reset, OAuth hand-off), profile and
//! account-level settings. Session state goes through the device
//! [`codenest_config::LocalStorage`] so every front-end sees the same login.

mod client;
mod session;

pub use client::{ApiClient, ApiError, ProfileUpdate, RegisterRequest, RemoteSettings};
pub use session::{initial_route, Route, Session, User};
