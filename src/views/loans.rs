use chrono::NaiveDate;
use maud::{html, Markup};

use super::{date, layout, Context};
use crate::models::issue::{IssueDetails, LoanPolicy};

pub fn issue_form(ctx: &Context, default_due: NaiveDate) -> Markup {
    layout(
        ctx,
        "Issue a book",
        html! {
            form.stacked method="post" action="/issue/" {
                label for="registration_no" { "Student registration no." }
                input #registration_no type="text" name="registration_no" maxlength="30" required autofocus;
                label for="book_isbn" { "Book ISBN" }
                input #book_isbn type="text" name="book_isbn" maxlength="13" required;
                label for="due_date" { "Due date" }
                input #due_date type="date" name="due_date" value=(default_due.format("%Y-%m-%d"));
                p { button type="submit" { "Issue book" } }
            }
        },
    )
}

fn issue_option(details: &IssueDetails) -> Markup {
    html! {
        option value=(details.issue.id) {
            (details.book_title) " · " (details.student_name) " (" (details.registration_no) ")"
            " · due " (date(details.issue.due_date))
        }
    }
}

pub fn return_form(ctx: &Context, open: &[IssueDetails]) -> Markup {
    layout(
        ctx,
        "Confirm book return",
        html! {
            @if open.is_empty() {
                p { "No books are currently issued." }
            } @else {
                form.stacked method="post" action="/return/" {
                    label for="issue_id" { "Issued book" }
                    select #issue_id name="issue_id" required {
                        @for details in open { (issue_option(details)) }
                    }
                    p { button type="submit" { "Confirm return" } }
                }
            }
        },
    )
}

pub fn renew_form(ctx: &Context, renewable: &[IssueDetails], policy: &LoanPolicy) -> Markup {
    layout(
        ctx,
        "Renew a book",
        html! {
            @if renewable.is_empty() {
                p { "No issued books can be renewed right now." }
            } @else {
                form.stacked method="post" action="/renew/" {
                    label for="issue_id" { "Issued book" }
                    select #issue_id name="issue_id" required {
                        @for details in renewable { (issue_option(details)) }
                    }
                    label for="renewal_days" { "Renewal days" }
                    input #renewal_days type="number" name="renewal_days"
                        min=(policy.renewal_days.start()) max=(policy.renewal_days.end())
                        value=(policy.default_renewal_days) required;
                    p { button type="submit" { "Renew" } }
                }
            }
        },
    )
}
