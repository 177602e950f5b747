//! Router-level tests: access control, form validation and health checks.
//!
//! Most tests use a lazily connecting pool and never reach the database;
//! the `#[sqlx::test]` ones get a fresh migrated database.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;

use campus_library::{
    api,
    config::AppConfig,
    models::user::{Role, UserClaims},
    repository::Repository,
    services::Services,
    AppState,
};

fn app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .unwrap();
    app_with_pool(pool, config)
}

fn app_with_pool(pool: PgPool, config: AppConfig) -> (Router, AppConfig) {
    let services = Services::new(Repository::new(pool), config.auth.clone(), config.library.clone());
    let state = AppState {
        config: Arc::new(config.clone()),
        services: Arc::new(services),
    };
    (api::router(state), config)
}

fn session_cookie(config: &AppConfig, role: Role, student_id: Option<i64>) -> String {
    let now = Utc::now().timestamp();
    let claims = UserClaims {
        sub: "tester".to_string(),
        user_id: 7,
        role,
        student_id,
        exp: now + 3600,
        iat: now,
    };
    let token = claims.create_token(&config.auth.jwt_secret).unwrap();
    format!("{}={}", api::SESSION_COOKIE, token)
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn sets_flash(response: &Response) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(api::flash::FLASH_COOKIE))
}

async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
}

async fn post_form(app: Router, uri: &str, cookie: Option<&str>, body: &str) -> Response {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn health_answers_without_database() {
    let (app, _) = app();
    let response = get(app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_visitors_see_landing_and_login_pages() {
    let (app, _) = app();
    assert_eq!(get(app.clone(), "/", None).await.status(), StatusCode::OK);
    assert_eq!(get(app.clone(), "/login/", None).await.status(), StatusCode::OK);
    assert_eq!(get(app, "/register/", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn signed_in_users_skip_the_landing_page() {
    let (app, config) = app();
    let cookie = session_cookie(&config, Role::Admin, None);

    let response = get(app.clone(), "/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/");

    let response = get(app, "/register/", Some(&cookie)).await;
    assert_eq!(location(&response), "/dashboard/");
}

#[tokio::test]
async fn anonymous_dashboard_redirects_to_login() {
    let (app, _) = app();
    let response = get(app, "/dashboard/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/");
}

#[tokio::test]
async fn forged_session_is_treated_as_anonymous() {
    let (app, _) = app();
    let cookie = format!("{}=not-a-jwt", api::SESSION_COOKIE);
    let response = get(app, "/books/", Some(&cookie)).await;
    assert_eq!(location(&response), "/login/");
}

#[tokio::test]
async fn students_are_sent_away_from_librarian_pages() {
    let (app, config) = app();
    let cookie = session_cookie(&config, Role::Student, Some(3));

    for uri in ["/issue/", "/return/", "/renew/", "/students/", "/requests/", "/reports/", "/books/add/"] {
        let response = get(app.clone(), uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/dashboard/", "{}", uri);
    }

    let response = post_form(app, "/requests/approve/1/", Some(&cookie), "").await;
    assert_eq!(location(&response), "/dashboard/");
}

#[tokio::test]
async fn anonymous_librarian_pages_redirect_to_login() {
    let (app, _) = app();
    let response = get(app, "/reports/", None).await;
    assert_eq!(location(&response), "/login/");
}

#[tokio::test]
async fn only_students_may_borrow() {
    let (app, config) = app();

    let admin = session_cookie(&config, Role::Admin, None);
    let response = post_form(app.clone(), "/borrow/1/", Some(&admin), "").await;
    assert_eq!(location(&response), "/login/");

    let unassigned = session_cookie(&config, Role::Unassigned, None);
    let response = post_form(app, "/return/confirm/1/", Some(&unassigned), "").await;
    assert_eq!(location(&response), "/login/");
}

#[tokio::test]
async fn state_changes_are_not_reachable_by_get() {
    let (app, config) = app();
    let cookie = session_cookie(&config, Role::Admin, None);
    let response = get(app, "/requests/approve/1/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn invalid_book_form_returns_to_the_form_with_messages() {
    let (app, config) = app();
    let cookie = session_cookie(&config, Role::Admin, None);

    let response = post_form(
        app,
        "/books/add/",
        Some(&cookie),
        "title=&author_name=Frank+Herbert&isbn=9780441013593&book_type=Novel&quantity=0",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books/add/");
    assert!(sets_flash(&response));
}

#[tokio::test]
async fn undecodable_issue_form_is_rejected_before_any_lookup() {
    let (app, config) = app();
    let cookie = session_cookie(&config, Role::Admin, None);

    let response = post_form(
        app,
        "/issue/",
        Some(&cookie),
        "registration_no=2020-EEE-014&book_isbn=9780441013593&due_date=tomorrow",
    )
    .await;

    assert_eq!(location(&response), "/issue/");
    assert!(sets_flash(&response));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (app, config) = app();
    let cookie = session_cookie(&config, Role::Student, Some(3));

    let response = post_form(app, "/logout/", Some(&cookie), "").await;
    assert_eq!(location(&response), "/login/");

    let cleared = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(api::SESSION_COOKIE) && v.contains("Max-Age=0"));
    assert!(cleared);
}

#[sqlx::test]
async fn unknown_book_pages_go_back_to_the_catalogue(pool: PgPool) {
    let (app, config) = app_with_pool(pool, AppConfig::default());
    let cookie = session_cookie(&config, Role::Admin, None);

    for uri in ["/book/edit/999999/", "/book/delete/999999/"] {
        let response = get(app.clone(), uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/books/", "{}", uri);
        assert!(sets_flash(&response), "{}", uri);
    }

    // the form posts report a missing book the same way
    let response = post_form(app, "/book/delete/999999/", Some(&cookie), "").await;
    assert_eq!(location(&response), "/books/");
    assert!(sets_flash(&response));
}

#[sqlx::test]
async fn blank_title_is_sent_back_to_the_form(pool: PgPool) {
    let (app, config) = app_with_pool(pool.clone(), AppConfig::default());
    let cookie = session_cookie(&config, Role::Admin, None);

    let response = post_form(
        app,
        "/books/add/",
        Some(&cookie),
        "title=+++&author_name=Frank+Herbert&isbn=+9780441013593+&book_type=Novel&quantity=2",
    )
    .await;

    assert_eq!(location(&response), "/books/add/");
    assert!(sets_flash(&response));
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}
