//! One-shot status messages carried to the next rendered page
//!
//! Messages are stored as base64-encoded JSON in a cookie; the page that
//! renders them removes the cookie.

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const FLASH_COOKIE: &str = "library_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    /// State conflicts are warnings, everything else is an error
    pub fn for_error(err: &AppError) -> Self {
        match err {
            AppError::Conflict(_) => Level::Warning,
            _ => Level::Error,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Level::Success => "flash flash-success",
            Level::Info => "flash flash-info",
            Level::Warning => "flash flash-warning",
            Level::Error => "flash flash-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

fn encode(messages: &[FlashMessage]) -> String {
    // serializing plain strings and enums cannot fail
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Messages queued so far, without consuming them
pub fn peek(jar: &CookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

/// Queue a message for the next page
pub fn push(jar: CookieJar, level: Level, text: impl Into<String>) -> CookieJar {
    let mut messages = peek(&jar);
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });
    jar.add(cookie(encode(&messages)))
}

/// Read and clear all queued messages
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    let messages = peek(&jar);
    if messages.is_empty() && jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

/// Queue a message and redirect
pub fn redirect(jar: CookieJar, level: Level, text: impl Into<String>, to: &str) -> (CookieJar, Redirect) {
    (push(jar, level, text), Redirect::to(to))
}

/// Report a failed operation on the next page.
///
/// Database and internal failures are logged here since they never reach
/// the error page.
pub fn redirect_error(jar: CookieJar, err: &AppError, to: &str) -> (CookieJar, Redirect) {
    match err {
        AppError::Database(e) => tracing::error!("Database error: {:?}", e),
        AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
        _ => {}
    }
    redirect(jar, Level::for_error(err), err.user_message(), to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_accumulate_and_are_consumed_once() {
        let jar = push(CookieJar::new(), Level::Success, "Book 'Dune' added successfully.");
        let jar = push(jar, Level::Warning, "Book 'Dune' is currently out of stock.");

        let (jar, messages) = take(jar);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, Level::Success);
        assert_eq!(messages[1].text, "Book 'Dune' is currently out of stock.");

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn tampered_cookie_yields_no_messages() {
        let jar = CookieJar::new().add(cookie("not base64 json!".to_string()));
        assert!(peek(&jar).is_empty());
    }

    #[test]
    fn conflicts_are_warnings() {
        assert_eq!(Level::for_error(&AppError::Conflict("x".into())), Level::Warning);
        assert_eq!(Level::for_error(&AppError::BusinessRule("x".into())), Level::Error);
        assert_eq!(Level::for_error(&AppError::NotFound("x".into())), Level::Error);
    }
}
