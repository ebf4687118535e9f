//! The admin-only page that displays the deletion audit log.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{Role, Session},
    deletion_log::{DeletionLogEntry, get_deletion_log},
    endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_timestamp,
    },
    navigation::NavBar,
};

/// The state needed for the deletion log page.
#[derive(Debug, Clone)]
pub struct DeletionLogViewState {
    /// The database connection for reading the log.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeletionLogViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the deletion audit log.
///
/// Viewers are redirected to the contributions page, the log is for the
/// admin only.
pub async fn get_deletion_log_page(
    State(state): State<DeletionLogViewState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    if session.role != Role::Admin {
        return Ok(Redirect::to(endpoints::CONTRIBUTIONS_VIEW).into_response());
    }

    let entries = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_deletion_log(&connection)?
    };

    Ok(deletion_log_view(&session, &entries).into_response())
}

fn deletion_log_view(session: &Session, entries: &[DeletionLogEntry]) -> Markup {
    let nav_bar = NavBar::new(
        endpoints::DELETION_LOG_VIEW,
        &session.username,
        session.role,
    )
    .into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE) {
            h2 class="text-2xl font-bold mb-4" { "Deletion Log" }

            @if entries.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "Nothing has been deleted yet." }
            } @else {
                div class="overflow-x-auto rounded-lg shadow w-full" {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                        thead class=(TABLE_HEADER_STYLE) {
                            tr {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Deleted At" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Entry" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Record ID" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Deleted By" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Reason" }
                            }
                        }
                        tbody {
                            @for entry in entries {
                                tr class=(TABLE_ROW_STYLE) {
                                    td class=(TABLE_CELL_STYLE) { (format_timestamp(entry.deleted_at)) }
                                    td class=(TABLE_CELL_STYLE) { (entry.record_type.label()) }
                                    td class=(TABLE_CELL_STYLE) { (entry.record_id) }
                                    td class=(TABLE_CELL_STYLE) { (entry.deleted_by) }
                                    td class=(TABLE_CELL_STYLE) { (entry.reason) }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Deletion Log", &[], &content)
}
