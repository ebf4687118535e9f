//! The endpoint for deleting a monthly contribution with a logged reason.

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
    contribution::delete_contribution,
    database_id::ContributionId,
    endpoints,
};

/// The state needed to delete a contribution.
#[derive(Debug, Clone)]
pub struct DeleteContributionState {
    /// The database connection for managing contributions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteContributionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted alongside a delete request.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteForm {
    /// Why the entry is being deleted. Must not be blank.
    pub reason: String,
}

/// Handle delete-contribution form submissions.
///
/// The deletion and its audit row are one transaction; on success the client
/// is redirected back to the contributions page.
pub async fn delete_contribution_endpoint(
    State(state): State<DeleteContributionState>,
    Path(contribution_id): Path<ContributionId>,
    Extension(session): Extension<Session>,
    Form(form): Form<DeleteForm>,
) -> Response {
    if let Err(error) = require_admin(&session) {
        return error.into_alert_response();
    }

    // The store checks this again, but rejecting blank reasons here keeps
    // the error out of the transaction path.
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

    match delete_contribution(
        contribution_id,
        &session.username,
        form.reason.trim(),
        &mut connection,
    ) {
        Ok(()) => (
            HxRedirect(endpoints::CONTRIBUTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DeleteMissingContribution) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "Could not delete contribution {contribution_id}: {error}"
            );

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_contribution_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        auth::{Role, Session},
        contribution::{create_contribution, get_all_contributions},
        db::initialize,
        deletion_log::get_deletion_log,
        endpoints,
        test_utils::assert_hx_redirect,
    };

    use super::{DeleteContributionState, DeleteForm, delete_contribution_endpoint};

    fn get_test_state() -> DeleteContributionState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        DeleteContributionState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn session(role: Role) -> Session {
        Session {
            username: "sam".to_owned(),
            role,
        }
    }

    #[tokio::test]
    async fn deletes_contribution_and_logs_reason() {
        let state = get_test_state();
        let contribution = create_contribution(
            "Alice",
            8.33,
            "January 2025",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_contribution_endpoint(
            State(state.clone()),
            Path(contribution.id),
            Extension(session(Role::Admin)),
            Form(DeleteForm {
                reason: "entered twice".to_owned(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CONTRIBUTIONS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_all_contributions(&connection).unwrap().is_empty());
        let log = get_deletion_log(&connection).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].deleted_by, "sam");
    }

    #[tokio::test]
    async fn rejects_blank_reason_without_mutating() {
        let state = get_test_state();
        let contribution = create_contribution(
            "Alice",
            8.33,
            "January 2025",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_contribution_endpoint(
            State(state.clone()),
            Path(contribution.id),
            Extension(session(Role::Admin)),
            Form(DeleteForm {
                reason: " \t ".to_owned(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_contributions(&connection).unwrap().len(), 1);
        assert!(get_deletion_log(&connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_contribution_returns_not_found_alert() {
        let state = get_test_state();

        let response = delete_contribution_endpoint(
            State(state.clone()),
            Path(42),
            Extension(session(Role::Admin)),
            Form(DeleteForm {
                reason: "cleanup".to_owned(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_deletion_log(&connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn viewer_cannot_delete() {
        let state = get_test_state();
        let contribution = create_contribution(
            "Alice",
            8.33,
            "January 2025",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_contribution_endpoint(
            State(state.clone()),
            Path(contribution.id),
            Extension(session(Role::Viewer)),
            Form(DeleteForm {
                reason: "should not matter".to_owned(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_contributions(&connection).unwrap().len(), 1);
        assert!(get_deletion_log(&connection).unwrap().is_empty());
    }
}
