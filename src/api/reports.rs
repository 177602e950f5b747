//! Circulation report

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;

use super::{page_context, AdminUser};
use crate::{error::AppResult, views, AppState};

pub async fn reports(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Markup)> {
    let report = state.services.stats.report().await?;
    let library = &state.config.library;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((
        jar,
        views::reports::report(&ctx, &report, library.fine_per_day, &library.currency),
    ))
}
