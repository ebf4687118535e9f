//! The page and endpoint for resetting a forgotten password.
//!
//! A reset succeeds only when the supplied username and email both match an
//! existing record. The app sends no email, so this matches the behavior of
//! a small club tool where the members know their registered addresses.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    auth::{PasswordHash, ValidatedPassword, update_password, verify_user_email},
    endpoints,
    html::{AUTH_LINK_STYLE, BUTTON_PRIMARY_STYLE, LINK_STYLE, auth_card, base, loading_spinner, password_input, text_input},
    internal_server_error::InternalServerError,
};

pub const RESET_MISMATCH_ERROR_MSG: &str = "Username and email do not match our records.";

/// The values and field errors used to re-render the reset form.
#[derive(Default)]
struct ResetFormState<'a> {
    username: &'a str,
    email: &'a str,
    username_error: Option<&'a str>,
    password_error: Option<&'a str>,
    confirm_password_error: Option<&'a str>,
}

fn reset_password_form(form_state: ResetFormState) -> Markup {
    html! {
        form
            hx-post=(endpoints::RESET_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", form_state.username, form_state.username_error))

            div
            {
                label
                    for="email"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Email"
                }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="name@example.com"
                    class="block w-full p-2.5 rounded text-sm text-gray-900 dark:text-white
                        bg-gray-50 dark:bg-gray-700 border border-gray-300 dark:border-gray-600"
                    required
                    value=(form_state.email);
            }

            (password_input("password", "New Password", form_state.password_error))

            div
            {
                label
                    for="confirm-password"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Confirm New Password"
                }

                input
                    type="password"
                    name="confirm_password"
                    id="confirm-password"
                    placeholder="••••••••"
                    class="block w-full p-2.5 rounded text-sm text-gray-900 dark:text-white
                        bg-gray-50 dark:bg-gray-700 border border-gray-300 dark:border-gray-600"
                    required;

                @if let Some(error_message) = form_state.confirm_password_error
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Reset Password"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Remembered it after all? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class=(AUTH_LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

fn reset_success_view() -> Markup {
    html! {
        div class="space-y-4"
        {
            p class="text-green-600 dark:text-green-400" { "Password updated successfully!" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in with your new password" }
            }
        }
    }
}

/// Display the password reset page.
pub async fn get_reset_password_page() -> Response {
    let form = reset_password_form(ResetFormState::default());
    let content = auth_card("Reset your password", &form);
    base("Reset Password", &[], &content).into_response()
}

/// The state needed to reset a password.
#[derive(Debug, Clone)]
pub struct ResetPasswordState {
    /// The database connection for updating the stored hash.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ResetPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by the password reset form.
#[derive(Serialize, Deserialize)]
pub struct ResetPasswordForm {
    /// The username of the account to reset.
    pub username: String,
    /// The email registered for that account.
    pub email: String,
    /// The new password.
    pub password: String,
    /// The new password, repeated.
    pub confirm_password: String,
}

/// Handler for password reset requests via the POST method.
///
/// The stored hash is only replaced when the username and email pair matches
/// an existing record (ignoring case on both).
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn reset_password(
    State(state): State<ResetPasswordState>,
    Form(form_data): Form<ResetPasswordForm>,
) -> Response {
    let form_state = ResetFormState {
        username: &form_data.username,
        email: &form_data.email,
        ..Default::default()
    };

    let validated_password = match ValidatedPassword::new(&form_data.password) {
        Ok(password) => password,
        Err(error) => {
            return reset_password_form(ResetFormState {
                password_error: Some(error.to_string().as_ref()),
                ..form_state
            })
            .into_response();
        }
    };

    if form_data.password != form_data.confirm_password {
        return reset_password_form(ResetFormState {
            confirm_password_error: Some("Passwords do not match"),
            ..form_state
        })
        .into_response();
    }

    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");

    match verify_user_email(&form_data.username, &form_data.email, &connection) {
        Ok(true) => {}
        Ok(false) => {
            return reset_password_form(ResetFormState {
                username_error: Some(RESET_MISMATCH_ERROR_MSG),
                ..form_state
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("Could not verify username and email: {error}");
            return InternalServerError::default().into_response();
        }
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return InternalServerError::default().into_response();
        }
    };

    match update_password(&form_data.username, password_hash, &connection) {
        Ok(()) => reset_success_view().into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while updating a password: {error}");
            InternalServerError::default().into_response()
        }
    }
}

#[cfg(test)]
mod reset_password_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        auth::{NewUser, PasswordHash, create_user, create_user_table, get_user_by_username},
        endpoints,
        test_utils::{assert_form_error_message, must_get_form, parse_fragment_text},
    };

    use super::{RESET_MISMATCH_ERROR_MSG, ResetPasswordForm, ResetPasswordState, reset_password};

    const NEW_PASSWORD: &str = "iamtestingwhethericancreateanewuser";

    fn get_test_state() -> ResetPasswordState {
        let mut connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create users table");
        create_user(
            NewUser {
                username: "sam".to_owned(),
                name: "Sam".to_owned(),
                email: "sam@example.com".to_owned(),
                password_hash: PasswordHash::from_raw_password("foobarbazquxgobbledygook", 4).unwrap(),
            },
            &mut connection,
        )
        .expect("Could not create test user");

        ResetPasswordState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: ResetPasswordState) -> TestServer {
        let app = Router::new()
            .route(endpoints::RESET_PASSWORD_API, post(reset_password))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server")
    }

    #[tokio::test]
    async fn reset_succeeds_with_matching_username_and_email() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::RESET_PASSWORD_API)
            .form(&ResetPasswordForm {
                // The lookup ignores case on both fields.
                username: "SAM".to_owned(),
                email: "Sam@Example.com".to_owned(),
                password: NEW_PASSWORD.to_owned(),
                confirm_password: NEW_PASSWORD.to_owned(),
            })
            .await;

        response.assert_status_ok();
        response.assert_text_contains("Password updated successfully!");

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("sam", &connection).unwrap();
        assert!(user.password_hash.verify(NEW_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn reset_fails_with_wrong_email() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::RESET_PASSWORD_API)
            .form(&ResetPasswordForm {
                username: "sam".to_owned(),
                email: "wrong@example.com".to_owned(),
                password: NEW_PASSWORD.to_owned(),
                confirm_password: NEW_PASSWORD.to_owned(),
            })
            .await;

        response.assert_status_ok();
        let html = parse_fragment_text(&response.text());
        let form = must_get_form(&html);
        assert_form_error_message(&form, RESET_MISMATCH_ERROR_MSG);

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("sam", &connection).unwrap();
        assert!(user.password_hash.verify("foobarbazquxgobbledygook").unwrap());
    }

    #[tokio::test]
    async fn reset_fails_when_passwords_do_not_match() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::RESET_PASSWORD_API)
            .form(&ResetPasswordForm {
                username: "sam".to_owned(),
                email: "sam@example.com".to_owned(),
                password: NEW_PASSWORD.to_owned(),
                confirm_password: "somethingelseentirely".to_owned(),
            })
            .await;

        response.assert_status_ok();
        let html = parse_fragment_text(&response.text());
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Passwords do not match");
    }
}
