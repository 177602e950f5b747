use maud::{html, Markup};

use super::{layout, Context};

pub fn home(ctx: &Context) -> Markup {
    layout(
        ctx,
        "Welcome",
        html! {
            p { "Browse the catalogue, request books and keep an eye on your due dates." }
            p {
                a href="/login/" { "Log in" }
                " or "
                a href="/register/" { "create a student account" }
                "."
            }
        },
    )
}

pub fn login(ctx: &Context) -> Markup {
    layout(
        ctx,
        "Log in",
        html! {
            form.stacked method="post" action="/login/" {
                label for="username" { "Username" }
                input #username type="text" name="username" required autofocus;
                label for="password" { "Password" }
                input #password type="password" name="password" required;
                p { button type="submit" { "Log in" } }
            }
            p { "No account yet? " a href="/register/" { "Register" } }
        },
    )
}

fn field(name: &str, label: &str, kind: &str, maxlength: Option<u32>) -> Markup {
    html! {
        label for=(name) { (label) }
        input id=(name) type=(kind) name=(name) maxlength=[maxlength] required;
    }
}

pub fn register(ctx: &Context) -> Markup {
    layout(
        ctx,
        "Student registration",
        html! {
            form.stacked method="post" action="/register/" {
                fieldset {
                    legend { "Account" }
                    (field("username", "Username", "text", Some(150)))
                    (field("email", "Email", "email", None))
                    (field("password", "Password", "password", None))
                    (field("confirm_password", "Confirm password", "password", None))
                }
                fieldset {
                    legend { "Student profile" }
                    (field("name", "Full name", "text", Some(100)))
                    (field("registration_no", "Registration no.", "text", Some(30)))
                    (field("roll", "Roll", "text", Some(10)))
                    (field("department", "Department", "text", Some(50)))
                    (field("season", "Session", "text", Some(50)))
                    (field("semester", "Semester", "text", Some(20)))
                    (field("shift", "Shift", "text", Some(20)))
                }
                p { button type="submit" { "Register" } }
            }
        },
    )
}
