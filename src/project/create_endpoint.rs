//! The endpoint for creating a special project.
//!
//! The create form is a multipart form so a document can be attached to the
//! project at creation time.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{Session, require_admin},
    endpoints,
    money::normalize_amount,
    project::{NewSpecialProject, create_special_project},
};

/// The state needed to create a special project.
#[derive(Debug, Clone)]
pub struct CreateProjectState {
    /// The database connection for managing projects.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateProjectState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The parsed fields of the create-project multipart form.
#[derive(Debug, Default)]
struct ProjectFormData {
    name: String,
    description: String,
    target_amount: Option<f64>,
    deadline: Option<Date>,
    document: Option<Vec<u8>>,
}

/// Handle create-project form submissions, responding with a redirect back
/// to the projects page or an alert.
pub async fn create_project_endpoint(
    State(state): State<CreateProjectState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Response {
    if let Err(error) = require_admin(&session) {
        return error.into_alert_response();
    }

    let form = match parse_project_form(multipart).await {
        Ok(form) => form,
        Err(error) => {
            tracing::error!("Failed to parse create-project form: {error}");
            return error.into_alert_response();
        }
    };

    let target_amount = form.target_amount.unwrap_or_default();

    if form.name.trim().is_empty() || target_amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "Please fill in the project name and a positive target amount."
                    .to_owned(),
            }
            .into_html(),
        )
            .into_response();
    }

    let new_project = NewSpecialProject {
        name: form.name.trim().to_owned(),
        description: form.description.trim().to_owned(),
        target_amount: normalize_amount(target_amount),
        deadline: form.deadline,
        document: form.document,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_special_project(new_project, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::PROJECTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a project: {error}");

            error.into_alert_response()
        }
    }
}

async fn parse_project_form(mut multipart: Multipart) -> Result<ProjectFormData, Error> {
    let mut form = ProjectFormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        // The field name has to be copied out before the field is consumed.
        let field_name = field.name().map(str::to_owned);

        match field_name.as_deref() {
            Some("name") => form.name = read_text_field(field).await?,
            Some("description") => form.description = read_text_field(field).await?,
            Some("target_amount") => {
                let raw = read_text_field(field).await?;
                form.target_amount = raw.trim().parse().ok();
            }
            Some("deadline") => {
                let raw = read_text_field(field).await?;
                form.deadline = parse_deadline(raw.trim());
            }
            Some("document") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;

                // An empty file input still submits a zero-length part.
                if !bytes.is_empty() {
                    form.document = Some(bytes.to_vec());
                }
            }
            name => {
                tracing::warn!("Unexpected field in create-project form: {name:?}");
            }
        }
    }

    Ok(form)
}

async fn read_text_field(field: Field<'_>) -> Result<String, Error> {
    field
        .text()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))
}

/// Parse an optional deadline in the "YYYY-MM-DD" format a date input submits.
///
/// An empty or malformed value is treated as no deadline rather than an
/// error, matching how optional date pickers submit.
fn parse_deadline(raw: &str) -> Option<Date> {
    if raw.is_empty() {
        return None;
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}
