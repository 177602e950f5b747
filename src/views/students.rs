use maud::{html, Markup};

use super::{layout, Context};
use crate::models::student::StudentWithAccount;

pub fn roster(ctx: &Context, students: &[StudentWithAccount]) -> Markup {
    layout(
        ctx,
        "Manage student accounts",
        html! {
            p { (students.len()) " registered students" }
            table {
                thead {
                    tr {
                        th { "Name" } th { "Reg. No." } th { "Roll" } th { "Department" }
                        th { "Session" } th { "Semester" } th { "Shift" } th { "Username" } th { "Email" }
                    }
                }
                tbody {
                    @for entry in students {
                        @let s = &entry.student;
                        tr {
                            td { (s.name) }
                            td { (s.registration_no) }
                            td { (s.roll) }
                            td { (s.department) }
                            td { (s.season) }
                            td { (s.semester) }
                            td { (s.shift) }
                            td { (entry.username) }
                            td { (entry.email) }
                        }
                    }
                }
            }
        },
    )
}
