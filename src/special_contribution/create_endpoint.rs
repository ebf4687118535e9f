//! The endpoint for adding a contribution to a special project.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{Session, require_admin},
    database_id::ProjectId,
    endpoints,
    money::normalize_amount,
    special_contribution::add_special_contribution,
};

/// The state needed to add a special contribution.
#[derive(Debug, Clone)]
pub struct CreateSpecialContributionState {
    /// The database connection for managing special contributions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSpecialContributionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by the add-special-contribution form.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpecialContributionForm {
    /// The project the contribution is for.
    pub project_id: ProjectId,
    /// The contributor's name.
    pub name: String,
    /// The raw entered amount.
    pub amount: f64,
    /// Optional free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// Handle add-special-contribution form submissions.
pub async fn create_special_contribution_endpoint(
    State(state): State<CreateSpecialContributionState>,
    Extension(session): Extension<Session>,
    Form(form): Form<SpecialContributionForm>,
) -> Response {
    if let Err(error) = require_admin(&session) {
        return error.into_alert_response();
    }

    if form.name.trim().is_empty() || form.amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "Please fill in the contributor name and a positive amount.".to_owned(),
            }
            .into_html(),
        )
            .into_response();
    }

    let amount = normalize_amount(form.amount);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match add_special_contribution(
        form.project_id,
        form.name.trim(),
        amount,
        form.notes.trim(),
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::PROJECTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::InvalidProject(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while adding a special contribution: {error}"
            );

            error.into_alert_response()
        }
    }
}
