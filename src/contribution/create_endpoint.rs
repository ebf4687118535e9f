//! The endpoint for adding a monthly contribution.

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
    contribution::create_contribution,
    endpoints,
    money::normalize_amount,
};

/// The state needed to create a contribution.
#[derive(Debug, Clone)]
pub struct CreateContributionState {
    /// The database connection for managing contributions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateContributionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by the add-contribution form.
///
/// `amount` is the raw entered value; it is normalized before it reaches the
/// store.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContributionForm {
    /// The name of the contributing member.
    pub member: String,
    /// The raw entered amount.
    pub amount: f64,
    /// The month the contribution is for.
    pub month: String,
}

/// Handle add-contribution form submissions, responding with a redirect back
/// to the contributions page or an alert.
pub async fn create_contribution_endpoint(
    State(state): State<CreateContributionState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ContributionForm>,
) -> Response {
    if let Err(error) = require_admin(&session) {
        return error.into_alert_response();
    }

    if form.member.trim().is_empty() || form.month.trim().is_empty() || form.amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "Please fill in the member, a positive amount, and the month.".to_owned(),
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

    match create_contribution(form.member.trim(), amount, form.month.trim(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CONTRIBUTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a contribution: {error}");

            error.into_alert_response()
        }
    }
}
