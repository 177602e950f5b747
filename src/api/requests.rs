//! Borrow requests: student submission and the librarian's queue

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;

use super::{
    flash::{self, Level},
    page_context, AdminUser, StudentUser,
};
use crate::{error::AppResult, repository::borrow_requests::ApprovalOutcome, views, AppState};

const REQUESTS_PATH: &str = "/requests/";
const BOOKS_PATH: &str = "/books/";

pub async fn list_requests(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Markup)> {
    let requests = state.services.requests.queue().await?;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((jar, views::requests::queue(&ctx, &requests)))
}

pub async fn approve_request(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    match state.services.requests.approve(id).await {
        Ok(ApprovalOutcome::Approved {
            issue,
            book,
            student_name,
            ..
        }) => flash::redirect(
            jar,
            Level::Success,
            format!(
                "Book '{}' issued and request approved for {}. Due: {}",
                book.title, student_name, issue.due_date
            ),
            REQUESTS_PATH,
        ),
        Ok(ApprovalOutcome::OutOfStock { book, .. }) => flash::redirect(
            jar,
            Level::Error,
            format!("Cannot approve. Book '{}' is out of stock.", book.title),
            REQUESTS_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, REQUESTS_PATH),
    }
}

pub async fn reject_request(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    match state.services.requests.reject(id).await {
        Ok(details) => flash::redirect(
            jar,
            Level::Info,
            format!(
                "Borrow request for {} from {} rejected.",
                details.book_title, details.student_name
            ),
            REQUESTS_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, REQUESTS_PATH),
    }
}

pub async fn borrow_book(
    State(state): State<AppState>,
    student: StudentUser,
    Path(book_id): Path<i64>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    match state
        .services
        .requests
        .request_book(student.student_id, book_id)
        .await
    {
        Ok((_, book)) => flash::redirect(
            jar,
            Level::Success,
            format!(
                "Request for '{}' submitted successfully. The librarian will review shortly.",
                book.title
            ),
            BOOKS_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, BOOKS_PATH),
    }
}
