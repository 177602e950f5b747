use maud::{html, Markup};

use super::{date, layout, Context};
use crate::{models::issue::IssueDetails, services::stats::LibraryReport};

fn issue_table(issues: &[IssueDetails], columns: impl Fn(&IssueDetails) -> Markup, extra_header: &str) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Book" } th { "ISBN" } th { "Student" } th { "Reg. No." }
                    th { "Issued" } th { "Due" } th { (extra_header) }
                }
            }
            tbody {
                @for details in issues {
                    tr {
                        td { (details.book_title) }
                        td { (details.book_isbn) }
                        td { (details.student_name) }
                        td { (details.registration_no) }
                        td { (date(details.issue.issue_date)) }
                        td { (date(details.issue.due_date)) }
                        td { (columns(details)) }
                    }
                }
            }
        }
    }
}

pub fn report(ctx: &Context, report: &LibraryReport, fine_per_day: i64, currency: &str) -> Markup {
    let today = report.today;
    layout(
        ctx,
        "Library report",
        html! {
            div.cards {
                div.card { strong { (report.current_issues.len()) } "Currently issued" }
                div.card { strong { (report.overdue.len()) } "Overdue" }
                div.card { strong { (report.total_potential_fine) " " (currency) } "Potential fines" }
            }

            h2 { "Overdue books" }
            @if report.overdue.is_empty() {
                p { "Nothing is overdue." }
            } @else {
                (issue_table(&report.overdue, |d| html! {
                    span.overdue { (d.issue.fine(today, fine_per_day)) " " (currency) }
                }, "Fine"))
            }

            h2 { "Current issues" }
            (issue_table(&report.current_issues, |d| html! { (d.issue.days_until_due(today)) }, "Days left"))

            h2 { "Returned" }
            (issue_table(&report.returned, |d| html! {
                @if let Some(returned) = d.issue.return_date { (date(returned)) }
            }, "Returned on"))
        },
    )
}
