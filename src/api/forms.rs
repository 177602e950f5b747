//! Validated form extraction

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    response::Redirect,
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::flash::{self, Level};
use crate::error::validation_messages;

/// A url-encoded form that passed its `validator` rules.
///
/// On failure every message is flashed as an error and the browser is sent
/// back to the page that posted the form.
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = (CookieJar, Redirect);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let back = req.uri().path().to_string();
        let jar = CookieJar::from_headers(req.headers());

        let Form(value) = match Form::<T>::from_request(req, state).await {
            Ok(form) => form,
            Err(rejection) => {
                tracing::debug!(path = %back, "Undecodable form: {}", rejection.body_text());
                return Err(flash::redirect(
                    jar,
                    Level::Error,
                    "Please fill in every field with a valid value.",
                    &back,
                ));
            }
        };

        if let Err(errors) = value.validate() {
            let jar = validation_messages(&errors)
                .into_iter()
                .fold(jar, |jar, message| flash::push(jar, Level::Error, message));
            return Err((jar, Redirect::to(&back)));
        }

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{student::StudentProfile, user::RegisterForm};

    fn profile(registration_no: &str) -> StudentProfile {
        StudentProfile {
            name: "Rahim Uddin".to_string(),
            registration_no: registration_no.to_string(),
            roll: "14".to_string(),
            department: "EEE".to_string(),
            season: "2020-21".to_string(),
            semester: "5th".to_string(),
            shift: "Day".to_string(),
        }
    }

    #[test]
    fn nested_profile_errors_are_reported() {
        let form = RegisterForm {
            username: "rahim".to_string(),
            email: "rahim@example.org".to_string(),
            password: "secret".to_string(),
            confirm_password: "different".to_string(),
            profile: profile(""),
        };

        let errors = form.validate().unwrap_err();
        let messages = validation_messages(&errors);
        assert_eq!(
            messages,
            vec![
                "Password and Confirm Password do not match.".to_string(),
                "Registration number must be 1-30 characters".to_string(),
            ]
        );
    }
}
