//! The endpoint for deleting a special project contribution with a logged reason.

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
    database_id::SpecialContributionId,
    endpoints,
    special_contribution::delete_special_contribution,
};

/// The state needed to delete a special contribution.
#[derive(Debug, Clone)]
pub struct DeleteSpecialContributionState {
    /// The database connection for managing special contributions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSpecialContributionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted alongside a delete request.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteSpecialContributionForm {
    /// Why the entry is being deleted. Must not be blank.
    pub reason: String,
}

/// Handle delete-special-contribution form submissions.
pub async fn delete_special_contribution_endpoint(
    State(state): State<DeleteSpecialContributionState>,
    Path(contribution_id): Path<SpecialContributionId>,
    Extension(session): Extension<Session>,
    Form(form): Form<DeleteSpecialContributionForm>,
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

    match delete_special_contribution(
        contribution_id,
        &session.username,
        form.reason.trim(),
        &mut connection,
    ) {
        Ok(()) => (
            HxRedirect(endpoints::PROJECTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete special contribution {contribution_id}: {error}");

            error.into_alert_response()
        }
    }
}
