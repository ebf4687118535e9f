//! Defines the app level error type and conversions to rendered HTML pages and alerts.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, database_id::ProjectId, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username and password combination did not check out.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// One of the two auth cookies is missing from the request's cookie jar.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The expiry cookie could not be parsed, or a new expiry could not be
    /// produced. Carries the underlying error and the offending value, both
    /// as strings.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user chose a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The hashing library failed unexpectedly.
    ///
    /// The contained string is for the server logs; clients only ever see a
    /// generic internal error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The username chosen at registration already exists in the database.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// A viewer tried to perform an action that is reserved for the admin.
    #[error("this action requires the admin role")]
    AdminRequired,

    /// A financial entry deletion was attempted without a reason.
    ///
    /// Every deletion must leave an audit trail explaining why the entry was
    /// removed, so an empty or whitespace-only reason is rejected before any
    /// row is touched.
    #[error("a reason must be given when deleting an entry")]
    EmptyDeletionReason,

    /// The project ID used to create an entry did not match a valid project.
    #[error("the project ID does not refer to a valid special project")]
    InvalidProject(Option<ProjectId>),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The requested resource was not found, including the case where a
    /// query returned no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a contribution that does not exist
    #[error("tried to delete a contribution that is not in the database")]
    DeleteMissingContribution,

    /// Tried to delete a special project contribution that does not exist
    #[error("tried to delete a special contribution that is not in the database")]
    DeleteMissingSpecialContribution,

    /// Tried to delete a project income entry that does not exist
    #[error("tried to delete a project income entry that is not in the database")]
    DeleteMissingProjectIncome,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an HTMX alert fragment with a matching status code.
    pub(crate) fn into_alert_response(self) -> Response {
        match self {
            Error::DuplicateUsername(username) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Username taken".to_owned(),
                    details: format!(
                        "The username {username} is already registered. Choose a different one."
                    ),
                }
                .into_html(),
            )
                .into_response(),
            Error::AdminRequired => (
                StatusCode::FORBIDDEN,
                Alert::ErrorSimple {
                    message: "Only the admin can make changes.".to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::EmptyDeletionReason => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Reason required".to_owned(),
                    details: "Provide a reason for deleting this entry so the deletion log stays \
                        meaningful."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::InvalidProject(project_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid project".to_owned(),
                    details: format!("Could not find a special project with the ID {project_id:?}"),
                }
                .into_html(),
            )
                .into_response(),
            Error::DeleteMissingContribution => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete contribution".to_owned(),
                    details: "The contribution could not be found. Try refreshing the page to \
                        see if it has already been deleted."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::DeleteMissingSpecialContribution => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete contribution".to_owned(),
                    details: "The project contribution could not be found. Try refreshing the \
                        page to see if it has already been deleted."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::DeleteMissingProjectIncome => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete income entry".to_owned(),
                    details: "The income entry could not be found. Try refreshing the page to \
                        see if it has already been deleted."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::ErrorSimple {
                        message: "An unexpected error occurred, check the server logs for more \
                            details."
                            .to_owned(),
                    }
                    .into_html(),
                )
                    .into_response()
            }
        }
    }
}
