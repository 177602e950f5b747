use maud::{html, Markup};

use super::{date, layout, post_button, Context};
use crate::models::borrow_request::{BorrowRequestDetails, RequestStatus};

pub fn queue(ctx: &Context, requests: &[BorrowRequestDetails]) -> Markup {
    layout(
        ctx,
        "Borrow requests",
        html! {
            @if requests.is_empty() {
                p { "No open requests." }
            } @else {
                table {
                    thead {
                        tr {
                            th { "Requested" } th { "Student" } th { "Reg. No." } th { "Book" }
                            th { "Available" } th { "Status" } th {}
                        }
                    }
                    tbody {
                        @for details in requests {
                            @let request = &details.request;
                            tr {
                                td { (date(request.request_date)) }
                                td { (details.student_name) }
                                td { (details.registration_no) }
                                td { (details.book_title) }
                                td { (details.available_copies) }
                                td { (request.status.label()) }
                                td {
                                    @if request.status == RequestStatus::Pending {
                                        (post_button(&format!("/requests/approve/{}/", request.id), "Approve"))
                                        " "
                                        (post_button(&format!("/requests/reject/{}/", request.id), "Reject"))
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
