//! The endpoint for adding an income entry to a special project.

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
    project_income::add_project_income,
};

/// The state needed to add project income.
#[derive(Debug, Clone)]
pub struct CreateProjectIncomeState {
    /// The database connection for managing project income.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateProjectIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by the add-income form.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectIncomeForm {
    /// The project the income is for.
    pub project_id: ProjectId,
    /// Where the money came from.
    pub source: String,
    /// The raw entered amount.
    pub amount: f64,
    /// Optional free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// Handle add-income form submissions.
pub async fn create_project_income_endpoint(
    State(state): State<CreateProjectIncomeState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ProjectIncomeForm>,
) -> Response {
    if let Err(error) = require_admin(&session) {
        return error.into_alert_response();
    }

    if form.source.trim().is_empty() || form.amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "Please fill in the income source and a positive amount.".to_owned(),
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

    match add_project_income(
        form.project_id,
        form.source.trim(),
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
            tracing::error!("An unexpected error occurred while adding project income: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_project_income_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        auth::{Role, Session},
        db::initialize,
        project::{NewSpecialProject, create_special_project},
        project_income::get_project_income,
    };

    use super::{CreateProjectIncomeState, ProjectIncomeForm, create_project_income_endpoint};

    fn get_test_state() -> (CreateProjectIncomeState, i64) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let project_id = create_special_project(
            NewSpecialProject {
                name: "Roof".to_owned(),
                target_amount: 83.33,
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        (
            CreateProjectIncomeState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            project_id,
        )
    }

    #[tokio::test]
    async fn adds_income_with_normalized_amount() {
        let (state, project_id) = get_test_state();
        let form = ProjectIncomeForm {
            project_id,
            source: "Bake sale".to_owned(),
            amount: 150.0,
            notes: String::new(),
        };

        let response = create_project_income_endpoint(
            State(state.clone()),
            Extension(Session {
                username: "sam".to_owned(),
                role: Role::Admin,
            }),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let income = get_project_income(project_id, &connection).unwrap();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].amount, 1.25);
    }

    #[tokio::test]
    async fn rejects_missing_source() {
        let (state, project_id) = get_test_state();
        let form = ProjectIncomeForm {
            project_id,
            source: "  ".to_owned(),
            amount: 150.0,
            notes: String::new(),
        };

        let response = create_project_income_endpoint(
            State(state.clone()),
            Extension(Session {
                username: "sam".to_owned(),
                role: Role::Admin,
            }),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_project_income(project_id, &connection).unwrap().is_empty());
    }
}
