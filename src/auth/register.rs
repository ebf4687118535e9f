//! The registration page and endpoint for creating a new account.
//!
//! The first account ever registered becomes the admin, every account after
//! that is a viewer.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{NewUser, PasswordHash, ValidatedPassword, create_user, username_exists},
    endpoints,
    html::{AUTH_LINK_STYLE, BUTTON_PRIMARY_STYLE, auth_card, base, loading_spinner, password_input, text_input},
    internal_server_error::InternalServerError,
};

/// The values and field errors used to re-render the registration form.
#[derive(Default)]
struct RegistrationFormState<'a> {
    username: &'a str,
    name: &'a str,
    email: &'a str,
    username_error: Option<&'a str>,
    email_error: Option<&'a str>,
    password_error: Option<&'a str>,
    confirm_password_error: Option<&'a str>,
}

fn registration_form(form_state: RegistrationFormState) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #name, #email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", form_state.username, form_state.username_error))
            (text_input("name", "Full Name", form_state.name, None))

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

                @if let Some(error_message) = form_state.email_error
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            (password_input("password", "Password", form_state.password_error))

            div
            {
                label
                    for="confirm-password"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Confirm Password"
                }

                input
                    type="password"
                    name="confirm_password"
                    id="confirm-password"
                    placeholder="••••••••"
                    class="block w-full p-2.5 rounded text-sm text-gray-900 dark:text-white
                        bg-gray-50 dark:bg-gray-700 border border-gray-300 dark:border-gray-600"
                    required
                    autofocus[form_state.confirm_password_error.is_some()];

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
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

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

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(RegistrationFormState::default());
    let content = auth_card("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    /// The unique name the user will log in with.
    pub username: String,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// The chosen password, repeated.
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the client is redirected to the log in page. On a validation
/// failure the form is re-rendered with an inline error message and no user
/// row is created.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let form_state = RegistrationFormState {
        username: &user_data.username,
        name: &user_data.name,
        email: &user_data.email,
        ..Default::default()
    };

    if user_data.username.trim().is_empty()
        || user_data.name.trim().is_empty()
        || user_data.email.trim().is_empty()
    {
        return registration_form(RegistrationFormState {
            username_error: Some("Please fill in all fields"),
            ..form_state
        })
        .into_response();
    }

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(RegistrationFormState {
                password_error: Some(error.to_string().as_ref()),
                ..form_state
            })
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(RegistrationFormState {
            confirm_password_error: Some("Passwords do not match"),
            ..form_state
        })
        .into_response();
    }

    {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        match username_exists(&user_data.username, &connection) {
            Ok(true) => {
                return registration_form(RegistrationFormState {
                    username_error: Some("Username already exists"),
                    ..form_state
                })
                .into_response();
            }
            Ok(false) => {}
            Err(error) => {
                tracing::error!("Could not check for existing username: {error}");
                return InternalServerError::default().into_response();
            }
        }
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");
            return InternalServerError::default().into_response();
        }
    };

    let result = create_user(
        NewUser {
            username: user_data.username.clone(),
            name: user_data.name.clone(),
            email: user_data.email.clone(),
            password_hash,
        },
        &mut state
            .db_connection
            .lock()
            .expect("Could not acquire database lock"),
    );

    match result {
        Ok(_) => (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        // The pre-check races with concurrent registrations, so the unique
        // key can still fire here.
        Err(Error::DuplicateUsername(_)) => registration_form(RegistrationFormState {
            username_error: Some("Username already exists"),
            ..form_state
        })
        .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            InternalServerError::default().into_response()
        }
    }
}
