//! Catalogue pages

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;

use super::{
    flash::{self, Level},
    forms::ValidatedForm,
    page_context, AdminUser, CurrentUser,
};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookForm},
    views, AppState,
};

const BOOKS_PATH: &str = "/books/";
const ADD_BOOK_PATH: &str = "/books/add/";

/// Load the book a page is about; an unknown id goes back to the catalogue
/// with a flash message, the same way the form posts report it.
async fn book_or_redirect(state: &AppState, id: i64, jar: CookieJar) -> Result<(CookieJar, Book), Response> {
    match state.services.catalog.get_book(id).await {
        Ok(book) => Ok((jar, book)),
        Err(e @ AppError::NotFound(_)) => Err(flash::redirect_error(jar, &e, BOOKS_PATH).into_response()),
        Err(e) => Err(e.into_response()),
    }
}

/// Everyone sees the catalogue; students also see which books they asked for
pub async fn list_books(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Markup)> {
    let student_id = claims.require_student().ok();
    let listing = state.services.catalog.list_books(student_id).await?;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((jar, views::books::list(&ctx, &listing)))
}

pub async fn add_book_page(AdminUser(claims): AdminUser, jar: CookieJar) -> (CookieJar, Markup) {
    let (jar, ctx) = page_context(jar, Some(claims));
    (jar, views::books::form(&ctx, "Add a book", ADD_BOOK_PATH, None))
}

pub async fn add_book(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<BookForm>,
) -> (CookieJar, Redirect) {
    match state.services.catalog.add_book(&form).await {
        Ok(book) => flash::redirect(
            jar,
            Level::Success,
            format!("Book '{}' added successfully.", book.title),
            ADD_BOOK_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, ADD_BOOK_PATH),
    }
}

pub async fn edit_book_page(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Markup), Response> {
    let (jar, book) = book_or_redirect(&state, id, jar).await?;

    let (jar, ctx) = page_context(jar, Some(claims));
    let action = format!("/book/edit/{}/", book.id);
    let form = BookForm::from(&book);
    Ok((jar, views::books::form(&ctx, "Edit book", &action, Some(&form))))
}

pub async fn edit_book(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<BookForm>,
) -> (CookieJar, Redirect) {
    match state.services.catalog.update_book(id, &form).await {
        Ok(book) => flash::redirect(
            jar,
            Level::Success,
            format!("Book '{}' updated successfully.", book.title),
            BOOKS_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, &format!("/book/edit/{}/", id)),
    }
}

pub async fn delete_book_page(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Markup), Response> {
    let (jar, book) = book_or_redirect(&state, id, jar).await?;

    let (jar, ctx) = page_context(jar, Some(claims));
    Ok((jar, views::books::confirm_delete(&ctx, &book)))
}

pub async fn delete_book(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    match state.services.catalog.delete_book(id).await {
        Ok(book) => flash::redirect(
            jar,
            Level::Success,
            format!("Book '{}' and all its records have been successfully deleted.", book.title),
            BOOKS_PATH,
        ),
        Err(e) => flash::redirect_error(jar, &e, BOOKS_PATH),
    }
}
