//! Role-specific landing page

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;

use super::{page_context, CurrentUser};
use crate::{error::AppResult, views, AppState};

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Markup)> {
    let dashboard = state.services.stats.dashboard(&claims).await?;
    let library = &state.config.library;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((
        jar,
        views::dashboard::dashboard(&ctx, &dashboard, library.fine_per_day, &library.currency),
    ))
}
