//! Account commands: login, register/verify, password flows, social sign-in.
//!
//! Secrets come from the flag, then the env var clap already consulted,
//! then one line of stdin (prompted when stdin is a TTY).

use std::io::{self, Write};

use codenest_api_client::{RegisterRequest, Session, User};

use crate::exit_codes::*;
use crate::{CliError, Context};

const PASSWORD_HINT: &str = "pass --password or set CODENEST_PASSWORD";

// ── Login / register ────────────────────────────────────────────────

pub fn cmd_login(ctx: &Context, email: String, password: Option<String>) -> Result<(), CliError> {
    let password = read_secret(password, "Password: ", PASSWORD_HINT)?;
    let session = ctx.api()?.login(&email, &password).map_err(CliError::api)?;
    eprintln!("Logged in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

pub fn cmd_register(ctx: &Context, name: String, email: String, password: Option<String>) -> Result<(), CliError> {
    let password = read_secret(password, "Password: ", PASSWORD_HINT)?;
    let api = ctx.api()?;
    let message = api
        .register(&RegisterRequest { name, email: email.clone(), password })
        .map_err(CliError::api)?;
    print_message(&message, "Verification code sent");
    eprintln!("Next: codenest verify --email {} --otp <CODE>", email);
    Ok(())
}

pub fn cmd_verify(ctx: &Context, email: String, otp: String) -> Result<(), CliError> {
    let session = ctx.api()?.verify_otp(&email, otp.trim()).map_err(CliError::api)?;
    eprintln!("Verified. Logged in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

pub fn cmd_resend_otp(ctx: &Context, email: String) -> Result<(), CliError> {
    let message = ctx.api()?.resend_otp(&email).map_err(CliError::api)?;
    print_message(&message, "Verification code sent");
    Ok(())
}

pub fn cmd_check_email(ctx: &Context, email: String) -> Result<(), CliError> {
    let exists = ctx.api()?.check_email(&email).map_err(CliError::api)?;
    println!("{}", if exists { "registered" } else { "available" });
    Ok(())
}

pub fn cmd_logout(ctx: &Context) -> Result<(), CliError> {
    ctx.api()?.logout().map_err(CliError::api)?;
    eprintln!("Logged out");
    Ok(())
}

pub fn cmd_whoami(ctx: &Context, refresh: bool, json: bool) -> Result<(), CliError> {
    let user = if refresh {
        ctx.api()?.get_profile().map_err(CliError::api)?
    } else {
        Session::load(ctx.storage.as_ref())
            .map_err(CliError::storage)?
            .map(|s| s.user)
            .ok_or_else(|| CliError::api(codenest_api_client::ApiError::NotAuthenticated))?
    };
    print_user(&user, json)
}

pub fn cmd_user(ctx: &Context, id: String, json: bool) -> Result<(), CliError> {
    let user = ctx.api()?.get_user(id.trim()).map_err(CliError::api)?;
    print_user(&user, json)
}

fn print_user(user: &User, json: bool) -> Result<(), CliError> {
    if json {
        let out = serde_json::to_string_pretty(user).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }
    println!("{} <{}>", user.name, user.email);
    if let Some(ref bio) = user.bio {
        println!("{}", bio);
    }
    if let Some(ref provider) = user.provider {
        println!("provider: {}", provider);
    }
    if let Some(created) = user.created_at {
        println!("member since: {}", created.format("%Y-%m-%d"));
    }
    Ok(())
}

// ── Password flows ──────────────────────────────────────────────────

pub fn cmd_forgot_password(ctx: &Context, email: String) -> Result<(), CliError> {
    let message = ctx.api()?.forgot_password(&email).map_err(CliError::api)?;
    print_message(&message, "Reset code sent");
    eprintln!("Next: codenest reset-password --email {} --otp <CODE>", email);
    Ok(())
}

pub fn cmd_reset_password(ctx: &Context, email: String, otp: String, password: Option<String>) -> Result<(), CliError> {
    let api = ctx.api()?;
    let reset_token = api.verify_reset_otp(&email, otp.trim()).map_err(CliError::api)?;
    let password = read_secret(password, "New password: ", "pass --password or set CODENEST_NEW_PASSWORD")?;
    let message = api
        .reset_password(&email, &reset_token, &password)
        .map_err(CliError::api)?;
    print_message(&message, "Password reset");
    Ok(())
}

pub fn cmd_change_password(ctx: &Context, current: String, new_password: String) -> Result<(), CliError> {
    let message = ctx
        .api()?
        .change_password(&current, &new_password)
        .map_err(CliError::api)?;
    print_message(&message, "Password changed");
    Ok(())
}

// ── Social ──────────────────────────────────────────────────────────

pub fn cmd_social(ctx: &Context, github: bool, token: Option<String>) -> Result<(), CliError> {
    let api = ctx.api()?;
    let Some(token) = token else {
        let url = if github { api.github_auth_url() } else { api.google_auth_url() };
        println!("{}", url);
        return Ok(());
    };

    let session = api.complete_social_login(token.trim()).map_err(CliError::api)?;
    eprintln!("Logged in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

fn print_message(message: &str, fallback: &str) {
    if message.is_empty() {
        eprintln!("{}", fallback);
    } else {
        eprintln!("{}", message);
    }
}

/// Flag/env value, else one line from stdin
pub(crate) fn read_secret(value: Option<String>, prompt: &str, hint: &str) -> Result<String, CliError> {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        return Ok(v);
    }

    if atty::is(atty::Stream::Stdin) {
        eprint!("{}", prompt);
        io::stderr().flush().ok();
    }
    let mut buf = String::new();
    io::stdin()
        .read_line(&mut buf)
        .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;

    let trimmed = buf.trim_end_matches(['\r', '\n']).to_string();
    if trimmed.is_empty() {
        return Err(CliError::usage(format!("No {} provided", prompt.trim_end_matches([':', ' ']).to_lowercase()))
            .with_hint(hint));
    }
    Ok(trimmed)
}
