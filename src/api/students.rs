//! Student roster

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;

use super::{page_context, AdminUser};
use crate::{error::AppResult, views, AppState};

pub async fn list_students(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Markup)> {
    let students = state.services.users.list_students().await?;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((jar, views::students::roster(&ctx, &students)))
}
