//! Defines the core data model and database queries for project income.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{IncomeId, ProjectId},
    deletion_log::{RecordType, record_deletion},
};

/// Money earned by a special project, e.g. from a fundraising event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectIncome {
    /// The ID of the income entry.
    pub id: IncomeId,
    /// The project the income belongs to.
    pub project_id: ProjectId,
    /// Where the money came from.
    pub source: String,
    /// The normalized amount earned.
    pub amount: f64,
    /// Free-text notes.
    pub notes: String,
    /// When the income was recorded.
    pub created_at: OffsetDateTime,
}

/// Create the project income table in the database.
///
/// Rows are removed automatically when their parent project is deleted.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_project_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS project_income (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                source TEXT NOT NULL,
                amount REAL NOT NULL,
                notes TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(project_id) REFERENCES special_projects(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new income entry in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidProject] if `project_id` does not refer to a real project,
/// - [Error::SqlError] if there is some other SQL error.
pub fn add_project_income(
    project_id: ProjectId,
    source: &str,
    amount: f64,
    notes: &str,
    connection: &Connection,
) -> Result<ProjectIncome, Error> {
    connection
        .prepare(
            "INSERT INTO project_income (project_id, source, amount, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, project_id, source, amount, notes, created_at",
        )?
        .query_row(
            (project_id, source, amount, notes, OffsetDateTime::now_utc()),
            map_project_income_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidProject(Some(project_id)),
            error => error.into(),
        })
}

/// Retrieve the income entries for `project_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_project_income(
    project_id: ProjectId,
    connection: &Connection,
) -> Result<Vec<ProjectIncome>, Error> {
    connection
        .prepare(
            "SELECT id, project_id, source, amount, notes, created_at
             FROM project_income
             WHERE project_id = :project_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":project_id", &project_id)], map_project_income_row)?
        .map(|maybe_income| maybe_income.map_err(Error::SqlError))
        .collect()
}

/// Delete an income entry, writing the audit row in the same transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDeletionReason] if `reason` is empty or whitespace,
/// - [Error::DeleteMissingProjectIncome] if `id` does not refer to a row,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_project_income(
    id: IncomeId,
    deleted_by: &str,
    reason: &str,
    connection: &mut Connection,
) -> Result<(), Error> {
    let transaction = connection.transaction()?;

    record_deletion(RecordType::ProjectIncome, id, deleted_by, reason, &transaction)?;

    let rows_affected =
        transaction.execute("DELETE FROM project_income WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingProjectIncome);
    }

    transaction.commit()?;

    Ok(())
}

/// Map a database row to a ProjectIncome.
pub(crate) fn map_project_income_row(row: &Row) -> Result<ProjectIncome, rusqlite::Error> {
    Ok(ProjectIncome {
        id: row.get(0)?,
        project_id: row.get(1)?,
        source: row.get(2)?,
        amount: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod project_income_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        deletion_log::{RecordType, get_deletion_log},
        project::{NewSpecialProject, create_special_project},
    };

    use super::{add_project_income, delete_project_income, get_project_income};

    fn get_connection_with_project() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let project_id = create_special_project(
            NewSpecialProject {
                name: "Roof".to_owned(),
                target_amount: 83.33,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        (conn, project_id)
    }

    #[test]
    fn add_succeeds() {
        let (conn, project_id) = get_connection_with_project();

        let income =
            add_project_income(project_id, "Bake sale", 1.25, "spring fair", &conn).unwrap();

        assert!(income.id > 0);
        assert_eq!(income.project_id, project_id);
        assert_eq!(income.source, "Bake sale");
        assert_eq!(income.amount, 1.25);
    }

    #[test]
    fn add_fails_for_unknown_project() {
        let (conn, project_id) = get_connection_with_project();

        let result = add_project_income(project_id + 1, "Bake sale", 1.25, "", &conn);

        assert_eq!(result, Err(Error::InvalidProject(Some(project_id + 1))));
    }

    #[test]
    fn delete_removes_row_and_writes_audit_entry() {
        let (mut conn, project_id) = get_connection_with_project();
        let income = add_project_income(project_id, "Bake sale", 1.25, "", &conn).unwrap();

        delete_project_income(income.id, "sam", "counted twice", &mut conn).unwrap();

        assert!(get_project_income(project_id, &conn).unwrap().is_empty());

        let log = get_deletion_log(&conn).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].record_type, RecordType::ProjectIncome);
        assert_eq!(log[0].record_id, income.id);
        assert_eq!(log[0].reason, "counted twice");
    }

    #[test]
    fn delete_missing_row_rolls_back_audit_entry() {
        let (mut conn, _) = get_connection_with_project();

        let result = delete_project_income(42, "sam", "no such entry", &mut conn);

        assert_eq!(result, Err(Error::DeleteMissingProjectIncome));
        assert!(get_deletion_log(&conn).unwrap().is_empty());
    }
}
