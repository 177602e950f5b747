//! Landing page, registration, login and logout

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::{
    end_session,
    flash::{self, Level},
    forms::ValidatedForm,
    page_context, start_session, MaybeUser, DASHBOARD_PATH, LOGIN_PATH,
};
use crate::{
    models::user::{LoginForm, RegisterForm},
    views, AppState,
};

pub async fn home(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    let (jar, ctx) = page_context(jar, None);
    (jar, views::auth::home(&ctx)).into_response()
}

pub async fn register_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    let (jar, ctx) = page_context(jar, None);
    (jar, views::auth::register(&ctx)).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<RegisterForm>,
) -> (CookieJar, Redirect) {
    match state.services.users.register_student(&form).await {
        Ok(session) => {
            let jar = start_session(jar, session.token, &state.config.auth);
            flash::redirect(
                jar,
                Level::Success,
                "Registration successful! Welcome to the Library System.",
                DASHBOARD_PATH,
            )
        }
        Err(e) => flash::redirect_error(jar, &e, "/register/"),
    }
}

pub async fn login_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    let (jar, ctx) = page_context(jar, None);
    (jar, views::auth::login(&ctx)).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> (CookieJar, Redirect) {
    match state.services.users.authenticate(&form.username, &form.password).await {
        Ok(session) => {
            let message = format!("You are now logged in as {}.", session.claims.sub);
            let jar = start_session(jar, session.token, &state.config.auth);
            flash::redirect(jar, Level::Info, message, DASHBOARD_PATH)
        }
        Err(e) => flash::redirect_error(jar, &e, LOGIN_PATH),
    }
}

pub async fn logout(MaybeUser(user): MaybeUser, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(claims) = user {
        tracing::info!(username = %claims.sub, "User logged out");
    }
    flash::redirect(
        end_session(jar),
        Level::Info,
        "You have successfully logged out.",
        LOGIN_PATH,
    )
}
