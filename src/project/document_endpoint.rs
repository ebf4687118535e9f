//! The endpoint for downloading a special project's attached document.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::ProjectId, project::get_project_document};

/// The state needed to serve a project document.
#[derive(Debug, Clone)]
pub struct ProjectDocumentState {
    /// The database connection for reading the document.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProjectDocumentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Serve the document attached to a project as a download.
///
/// Responds with 404 if the project does not exist or has no document. The
/// original file name is not stored, so the download is named after the
/// project ID.
pub async fn get_project_document_endpoint(
    State(state): State<ProjectDocumentState>,
    Path(project_id): Path<ProjectId>,
) -> Result<Response, Error> {
    let document = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_project_document(project_id, &connection)?
    };

    match document {
        Some(bytes) => Ok((
            StatusCode::OK,
            [
                (CONTENT_TYPE, "application/octet-stream".to_owned()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"project-{project_id}-document\""),
                ),
            ],
            bytes,
        )
            .into_response()),
        None => Err(Error::NotFound),
    }
}
