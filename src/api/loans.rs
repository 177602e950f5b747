//! Circulation desk: issue, return and renew

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;

use super::{
    flash::{self, Level},
    forms::ValidatedForm,
    page_context, AdminUser, StudentUser, DASHBOARD_PATH,
};
use crate::{
    error::AppResult,
    models::issue::{IssueBookForm, RenewBookForm, ReturnBookForm},
    views, AppState,
};

const ISSUE_PATH: &str = "/issue/";
const RETURN_PATH: &str = "/return/";
const RENEW_PATH: &str = "/renew/";

pub async fn issue_page(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    jar: CookieJar,
) -> (CookieJar, Markup) {
    let default_due = state
        .services
        .loans
        .policy()
        .default_due_date(state.services.stats.today());

    let (jar, ctx) = page_context(jar, Some(claims));
    (jar, views::loans::issue_form(&ctx, default_due))
}

pub async fn issue_book(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<IssueBookForm>,
) -> (CookieJar, Redirect) {
    match state.services.loans.issue_book(&form).await {
        Ok(receipt) => flash::redirect(
            jar,
            Level::Success,
            format!(
                "Book '{}' issued to {} successfully.",
                receipt.book_title, receipt.student_name
            ),
            ISSUE_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, ISSUE_PATH),
    }
}

pub async fn return_page(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Markup)> {
    let open = state.services.loans.open_issues().await?;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((jar, views::loans::return_form(&ctx, &open)))
}

pub async fn return_book(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<ReturnBookForm>,
) -> (CookieJar, Redirect) {
    match state.services.loans.return_book(form.issue_id).await {
        Ok(receipt) => {
            let fine_message = if receipt.fine > 0 {
                format!(" (Fine: {} {}).", receipt.fine, state.services.loans.policy().currency)
            } else {
                ".".to_string()
            };
            flash::redirect(
                jar,
                Level::Success,
                format!(
                    "Book '{}' returned successfully by {}{}",
                    receipt.book_title, receipt.student_name, fine_message
                ),
                RETURN_PATH,
            )
        }
        Err(e) => flash::redirect_error(jar, &e, RETURN_PATH),
    }
}

pub async fn renew_page(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Markup)> {
    let renewable = state.services.loans.renewable_issues().await?;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((
        jar,
        views::loans::renew_form(&ctx, &renewable, state.services.loans.policy()),
    ))
}

pub async fn renew_book(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<RenewBookForm>,
) -> (CookieJar, Redirect) {
    match state.services.loans.renew_book(form.issue_id, form.renewal_days).await {
        Ok(receipt) => flash::redirect(
            jar,
            Level::Success,
            format!(
                "Book '{}' successfully renewed for {} by {} days. New Due Date: {}.",
                receipt.book_title, receipt.student_name, form.renewal_days, receipt.issue.due_date
            ),
            RENEW_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, RENEW_PATH),
    }
}

/// A student announces a return; the librarian still has to check it in
pub async fn confirm_return(
    State(state): State<AppState>,
    student: StudentUser,
    Path(issue_id): Path<i64>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    match state
        .services
        .loans
        .confirm_student_return(student.student_id, issue_id)
        .await
    {
        Ok(details) => flash::redirect(
            jar,
            Level::Info,
            format!(
                "You have confirmed the return of '{}'. Please submit the book to the library counter for final check-in by the librarian.",
                details.book_title
            ),
            DASHBOARD_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, DASHBOARD_PATH),
    }
}
