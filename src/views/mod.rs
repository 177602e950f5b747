//! Server-rendered HTML pages (maud)

pub mod auth;
pub mod books;
pub mod dashboard;
pub mod loans;
pub mod reports;
pub mod requests;
pub mod students;

use axum::http::StatusCode;
use chrono::NaiveDate;
use maud::{html, Markup, DOCTYPE};

use crate::{api::flash::FlashMessage, models::user::UserClaims};

/// What every page needs besides its own content
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub user: Option<UserClaims>,
    pub messages: Vec<FlashMessage>,
}

impl Context {
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin())
    }

    pub fn is_student(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_student())
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #222; }
nav { background: #1f3b57; padding: .6rem 1.2rem; display: flex; gap: 1rem; align-items: center; }
nav a, nav button { color: #fff; text-decoration: none; background: none; border: 0; font: inherit; cursor: pointer; }
nav .spacer { flex: 1; }
main { max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
table { border-collapse: collapse; width: 100%; background: #fff; margin-bottom: 1.5rem; }
th, td { border: 1px solid #d9dde3; padding: .4rem .6rem; text-align: left; }
th { background: #eef1f5; }
form.stacked label { display: block; margin-top: .6rem; }
form.stacked input, form.stacked select { width: 100%; max-width: 420px; padding: .3rem; }
form.inline { display: inline; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; margin-bottom: 1.5rem; }
.card { background: #fff; border: 1px solid #d9dde3; padding: .8rem 1.2rem; min-width: 150px; }
.card strong { display: block; font-size: 1.6rem; }
.flash { padding: .6rem 1rem; margin-bottom: .6rem; border-left: 4px solid; background: #fff; }
.flash-success { border-color: #2e7d32; }
.flash-info { border-color: #1565c0; }
.flash-warning { border-color: #f9a825; }
.flash-error { border-color: #c62828; }
.overdue { color: #c62828; font-weight: bold; }
"#;

fn nav(ctx: &Context) -> Markup {
    html! {
        nav {
            a href="/" { "Campus Library" }
            @if let Some(user) = &ctx.user {
                a href="/dashboard/" { "Dashboard" }
                a href="/books/" { "Books" }
                @if user.is_admin() {
                    a href="/issue/" { "Issue" }
                    a href="/return/" { "Return" }
                    a href="/renew/" { "Renew" }
                    a href="/requests/" { "Requests" }
                    a href="/students/" { "Students" }
                    a href="/reports/" { "Reports" }
                }
                span.spacer {}
                span { (user.sub) }
                form.inline method="post" action="/logout/" {
                    button type="submit" { "Log out" }
                }
            } @else {
                span.spacer {}
                a href="/login/" { "Log in" }
                a href="/register/" { "Register" }
            }
        }
    }
}

/// Full page with navigation and pending flash messages
pub fn layout(ctx: &Context, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Campus Library" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                (nav(ctx))
                main {
                    @for message in &ctx.messages {
                        div class=(message.level.css_class()) { (message.text) }
                    }
                    h1 { (title) }
                    (content)
                }
            }
        }
    }
}

/// Standalone page for errors that could not be turned into a redirect
pub fn error_page(status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        &Context::default(),
        title,
        html! {
            p { (message) }
            p { a href="/" { "Back to the library" } }
        },
    )
}

/// A button that posts to `action`; state changes never happen on GET
pub(crate) fn post_button(action: &str, label: &str) -> Markup {
    html! {
        form.inline method="post" action=(action) {
            button type="submit" { (label) }
        }
    }
}

pub(crate) fn date(value: NaiveDate) -> String {
    value.format("%d %b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::flash::Level;

    #[test]
    fn layout_escapes_flash_text() {
        let ctx = Context {
            user: None,
            messages: vec![FlashMessage {
                level: Level::Error,
                text: "<script>alert(1)</script>".to_string(),
            }],
        };
        let page = layout(&ctx, "Books", html! {}).into_string();
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("flash-error"));
        assert!(page.contains("/login/"));
    }

    #[test]
    fn error_page_names_the_status() {
        let page = error_page(StatusCode::NOT_FOUND, "Book not found").into_string();
        assert!(page.contains("Not Found"));
        assert!(page.contains("Book not found"));
    }
}
