use maud::{html, Markup};

use super::{date, layout, post_button, Context};
use crate::services::stats::{AdminDashboard, Dashboard, StudentDashboard};

fn card(label: &str, value: impl std::fmt::Display) -> Markup {
    html! {
        div.card { strong { (value) } (label) }
    }
}

fn admin(stats: &AdminDashboard) -> Markup {
    html! {
        div.cards {
            (card("Total books", stats.total_books))
            (card("Students", stats.total_students))
            (card("Currently issued", stats.issued_books))
            (card("Pending requests", stats.pending_requests))
            (card("Overdue", stats.overdue_books))
        }
        p {
            a href="/books/add/" { "Add a book" } " · "
            a href="/issue/" { "Issue a book" } " · "
            a href="/requests/" { "Review requests" }
        }
    }
}

fn student(stats: &StudentDashboard, fine_per_day: i64, currency: &str) -> Markup {
    let profile = &stats.student;
    html! {
        p {
            (profile.name) " · Reg. No. " (profile.registration_no)
            " · " (profile.department) ", " (profile.semester) " semester, " (profile.shift) " shift"
        }
        div.cards {
            (card("Books issued", stats.total_issued()))
            (card("Due soon", stats.due_soon))
            (card("Overdue", stats.overdue))
            (card("Pending requests", stats.pending_requests))
            (card("Approved requests", stats.approved_requests))
        }
        h2 { "My books" }
        @if stats.issues.is_empty() {
            p { "You have no books issued. " a href="/books/" { "Browse the catalogue" } "." }
        } @else {
            table {
                thead { tr { th { "Title" } th { "Issued" } th { "Due" } th { "Days left" } th { "Fine" } th {} } }
                tbody {
                    @for details in &stats.issues {
                        @let issue = &details.issue;
                        @let overdue = issue.is_overdue(stats.today);
                        tr {
                            td { (details.book_title) }
                            td { (date(issue.issue_date)) }
                            td class=[overdue.then_some("overdue")] { (date(issue.due_date)) }
                            td { (issue.days_until_due(stats.today)) }
                            td { (issue.fine(stats.today, fine_per_day)) " " (currency) }
                            td { (post_button(&format!("/return/confirm/{}/", issue.id), "I am returning this")) }
                        }
                    }
                }
            }
        }
    }
}

pub fn dashboard(ctx: &Context, dashboard: &Dashboard, fine_per_day: i64, currency: &str) -> Markup {
    let content = match dashboard {
        Dashboard::Admin(stats) => admin(stats),
        Dashboard::Student(stats) => student(stats, fine_per_day, currency),
        Dashboard::Unassigned => html! {
            p { "Your account has no library role yet. Please contact the librarian." }
        },
    };
    layout(ctx, "Dashboard", content)
}
