use maud::{html, Markup};

use super::{layout, post_button, Context};
use crate::{
    models::book::{Book, BookForm},
    services::catalog::BookListing,
};

fn student_action(book: &Book, listing: &BookListing) -> Markup {
    if listing.requested.contains(&book.id) {
        html! { em { "Requested" } }
    } else if book.is_in_stock() {
        post_button(&format!("/borrow/{}/", book.id), "Request")
    } else {
        html! { "Out of stock" }
    }
}

pub fn list(ctx: &Context, listing: &BookListing) -> Markup {
    layout(
        ctx,
        "Books",
        html! {
            @if ctx.is_admin() {
                p { a href="/books/add/" { "Add a book" } }
            }
            @if listing.books.is_empty() {
                p { "The catalogue is empty." }
            } @else {
                table {
                    thead {
                        tr {
                            th { "Title" } th { "Author" } th { "ISBN" } th { "Type" }
                            th { "Copies" } th { "Available" } th {}
                        }
                    }
                    tbody {
                        @for book in &listing.books {
                            tr {
                                td { (book.title) }
                                td { (book.author_name) }
                                td { (book.isbn) }
                                td { (book.book_type) }
                                td { (book.quantity) }
                                td { (book.available_copies) }
                                td {
                                    @if ctx.is_admin() {
                                        a href=(format!("/book/edit/{}/", book.id)) { "Edit" } " "
                                        a href=(format!("/book/delete/{}/", book.id)) { "Delete" }
                                    } @else if ctx.is_student() {
                                        (student_action(book, listing))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

/// Add or edit form; `form` pre-fills the fields when editing
pub fn form(ctx: &Context, title: &str, action: &str, form: Option<&BookForm>) -> Markup {
    let (book_title, author_name, isbn, book_type, quantity) = match form {
        Some(f) => (f.title.as_str(), f.author_name.as_str(), f.isbn.as_str(), f.book_type.as_str(), f.quantity),
        None => ("", "", "", "", 1),
    };
    layout(
        ctx,
        title,
        html! {
            form.stacked method="post" action=(action) {
                label for="title" { "Title" }
                input #title type="text" name="title" maxlength="200" required value=(book_title);
                label for="author_name" { "Author" }
                input #author_name type="text" name="author_name" maxlength="100" required value=(author_name);
                label for="isbn" { "ISBN" }
                input #isbn type="text" name="isbn" maxlength="13" required value=(isbn);
                label for="book_type" { "Type" }
                input #book_type type="text" name="book_type" maxlength="50" required value=(book_type);
                label for="quantity" { "Quantity" }
                input #quantity type="number" name="quantity" min="1" required value=(quantity);
                p { button type="submit" { "Save" } " " a href="/books/" { "Cancel" } }
            }
        },
    )
}

pub fn confirm_delete(ctx: &Context, book: &Book) -> Markup {
    layout(
        ctx,
        "Delete book",
        html! {
            p {
                "Delete '" (book.title) "' by " (book.author_name)
                " together with all of its issue and request records?"
            }
            @if book.issued_copies() > 0 {
                p.overdue { (book.issued_copies()) " copies are still issued out." }
            }
            form method="post" action=(format!("/book/delete/{}/", book.id)) {
                button type="submit" { "Delete" } " " a href="/books/" { "Cancel" }
            }
        },
    )
}
