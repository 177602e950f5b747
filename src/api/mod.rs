//! HTTP handlers, role extractors and the router

pub mod auth;
pub mod books;
pub mod dashboard;
pub mod flash;
pub mod forms;
pub mod health;
pub mod loans;
pub mod reports;
pub mod requests;
pub mod students;

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{config::AuthConfig, models::user::UserClaims, views::Context, AppState};

pub const SESSION_COOKIE: &str = "library_session";

pub const LOGIN_PATH: &str = "/login/";
pub const DASHBOARD_PATH: &str = "/dashboard/";

/// Claims from a valid session cookie, if any
fn session_claims(parts: &Parts, state: &AppState) -> Option<UserClaims> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(SESSION_COOKIE)?.value().to_string();

    match UserClaims::from_token(&token, &state.config.auth.jwt_secret) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!("Ignoring invalid session token: {}", e);
            None
        }
    }
}

/// Store a freshly signed session token.
///
/// The cookie lives for the browser session; the token itself expires after
/// `session_hours`.
pub fn start_session(jar: CookieJar, token: String, config: &AuthConfig) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Consume pending flash messages for a page about to be rendered
pub fn page_context(jar: CookieJar, user: Option<UserClaims>) -> (CookieJar, Context) {
    let (jar, messages) = flash::take(jar);
    (jar, Context { user, messages })
}

/// Whoever is signed in, or nobody
pub struct MaybeUser(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_claims(parts, state)))
    }
}

/// Any signed-in user; anonymous visitors go to the login page
pub struct CurrentUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_claims(parts, state)
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// A librarian. Other signed-in users are sent to their dashboard.
pub struct AdminUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match session_claims(parts, state) {
            Some(claims) if claims.is_admin() => Ok(AdminUser(claims)),
            Some(claims) => {
                tracing::debug!(username = %claims.sub, path = %parts.uri.path(), "Librarian page refused");
                Err(Redirect::to(DASHBOARD_PATH))
            }
            None => Err(Redirect::to(LOGIN_PATH)),
        }
    }
}

/// A student with a profile
pub struct StudentUser {
    pub claims: UserClaims,
    pub student_id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for StudentUser {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = session_claims(parts, state).ok_or_else(|| Redirect::to(LOGIN_PATH))?;
        match claims.require_student() {
            Ok(student_id) => Ok(StudentUser { claims, student_id }),
            Err(_) => Err(Redirect::to(LOGIN_PATH)),
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Identity
        .route("/", get(auth::home))
        .route("/register/", get(auth::register_page).post(auth::register))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", post(auth::logout))
        .route("/dashboard/", get(dashboard::dashboard))
        // Catalogue
        .route("/books/", get(books::list_books))
        .route("/books/add/", get(books::add_book_page).post(books::add_book))
        .route("/book/edit/:id/", get(books::edit_book_page).post(books::edit_book))
        .route("/book/delete/:id/", get(books::delete_book_page).post(books::delete_book))
        // Circulation desk
        .route("/issue/", get(loans::issue_page).post(loans::issue_book))
        .route("/return/", get(loans::return_page).post(loans::return_book))
        .route("/renew/", get(loans::renew_page).post(loans::renew_book))
        .route("/return/confirm/:issue_id/", post(loans::confirm_return))
        // Borrow requests
        .route("/requests/", get(requests::list_requests))
        .route("/requests/approve/:id/", post(requests::approve_request))
        .route("/requests/reject/:id/", post(requests::reject_request))
        .route("/borrow/:book_id/", post(requests::borrow_book))
        // Librarian views
        .route("/students/", get(students::list_students))
        .route("/reports/", get(reports::reports))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
