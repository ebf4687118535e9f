//! The endpoint for deleting a project income entry with a logged reason.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{Session, require_admin},
    database_id::IncomeId,
    endpoints,
    project_income::delete_project_income,
};

/// The state needed to delete project income.
#[derive(Debug, Clone)]
pub struct DeleteProjectIncomeState {
    /// The database connection for managing project income.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteProjectIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted alongside a delete request.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteProjectIncomeForm {
    /// Why the entry is being deleted. Must not be blank.
    pub reason: String,
}

/// Handle delete-income form submissions.
pub async fn delete_project_income_endpoint(
    State(state): State<DeleteProjectIncomeState>,
    Path(income_id): Path<IncomeId>,
    Extension(session): Extension<Session>,
    Form(form): Form<DeleteProjectIncomeForm>,
) -> Response {
    if let Err(error) = require_admin(&session) {
        return error.into_alert_response();
    }

    if form.reason.trim().is_empty() {
        return Error::EmptyDeletionReason.into_alert_response();
    }

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_project_income(income_id, &session.username, form.reason.trim(), &mut connection)
    {
        Ok(()) => (
            HxRedirect(endpoints::PROJECTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete project income {income_id}: {error}");

            error.into_alert_response()
        }
    }
}
