//! Defines the core data model and database queries for special project contributions.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{ProjectId, SpecialContributionId},
    deletion_log::{RecordType, record_deletion},
};

/// A contribution made towards a special project.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialContribution {
    /// The ID of the contribution.
    pub id: SpecialContributionId,
    /// The project the contribution belongs to.
    pub project_id: ProjectId,
    /// The name of the contributor.
    pub name: String,
    /// The normalized amount contributed.
    pub amount: f64,
    /// Free-text notes.
    pub notes: String,
    /// When the contribution was recorded.
    pub created_at: OffsetDateTime,
}

/// Create the special contributions table in the database.
///
/// Rows are removed automatically when their parent project is deleted.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_special_contribution_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS special_contributions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                amount REAL NOT NULL,
                notes TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(project_id) REFERENCES special_projects(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new special contribution in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidProject] if `project_id` does not refer to a real project,
/// - [Error::SqlError] if there is some other SQL error.
pub fn add_special_contribution(
    project_id: ProjectId,
    name: &str,
    amount: f64,
    notes: &str,
    connection: &Connection,
) -> Result<SpecialContribution, Error> {
    connection
        .prepare(
            "INSERT INTO special_contributions (project_id, name, amount, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, project_id, name, amount, notes, created_at",
        )?
        .query_row(
            (project_id, name, amount, notes, OffsetDateTime::now_utc()),
            map_special_contribution_row,
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

/// Retrieve the contributions for `project_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_special_contributions(
    project_id: ProjectId,
    connection: &Connection,
) -> Result<Vec<SpecialContribution>, Error> {
    connection
        .prepare(
            "SELECT id, project_id, name, amount, notes, created_at
             FROM special_contributions
             WHERE project_id = :project_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":project_id", &project_id)], map_special_contribution_row)?
        .map(|maybe_contribution| maybe_contribution.map_err(Error::SqlError))
        .collect()
}

/// Delete a special contribution, writing the audit row in the same transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDeletionReason] if `reason` is empty or whitespace,
/// - [Error::DeleteMissingSpecialContribution] if `id` does not refer to a row,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_special_contribution(
    id: SpecialContributionId,
    deleted_by: &str,
    reason: &str,
    connection: &mut Connection,
) -> Result<(), Error> {
    let transaction = connection.transaction()?;

    record_deletion(
        RecordType::SpecialContribution,
        id,
        deleted_by,
        reason,
        &transaction,
    )?;

    let rows_affected = transaction.execute(
        "DELETE FROM special_contributions WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingSpecialContribution);
    }

    transaction.commit()?;

    Ok(())
}

/// Map a database row to a SpecialContribution.
pub(crate) fn map_special_contribution_row(
    row: &Row,
) -> Result<SpecialContribution, rusqlite::Error> {
    Ok(SpecialContribution {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod special_contribution_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        deletion_log::{RecordType, get_deletion_log},
        project::{NewSpecialProject, create_special_project},
    };

    use super::{
        add_special_contribution, delete_special_contribution, get_special_contributions,
    };

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

        let contribution =
            add_special_contribution(project_id, "Alice", 4.17, "first instalment", &conn).unwrap();

        assert!(contribution.id > 0);
        assert_eq!(contribution.project_id, project_id);
        assert_eq!(contribution.name, "Alice");
        assert_eq!(contribution.amount, 4.17);
        assert_eq!(contribution.notes, "first instalment");
    }

    #[test]
    fn add_fails_for_unknown_project() {
        let (conn, project_id) = get_connection_with_project();

        let result = add_special_contribution(project_id + 1, "Alice", 4.17, "", &conn);

        assert_eq!(result, Err(Error::InvalidProject(Some(project_id + 1))));
    }

    #[test]
    fn get_filters_by_project() {
        let (conn, first_project) = get_connection_with_project();
        let second_project = create_special_project(
            NewSpecialProject {
                name: "Van".to_owned(),
                target_amount: 250.0,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();
        add_special_contribution(first_project, "Alice", 1.0, "", &conn).unwrap();
        add_special_contribution(second_project, "Bob", 2.0, "", &conn).unwrap();

        let contributions = get_special_contributions(first_project, &conn).unwrap();

        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].name, "Alice");
    }

    #[test]
    fn delete_removes_row_and_writes_audit_entry() {
        let (mut conn, project_id) = get_connection_with_project();
        let contribution =
            add_special_contribution(project_id, "Alice", 4.17, "", &conn).unwrap();

        delete_special_contribution(contribution.id, "sam", "wrong project", &mut conn).unwrap();

        assert!(get_special_contributions(project_id, &conn).unwrap().is_empty());

        let log = get_deletion_log(&conn).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].record_type, RecordType::SpecialContribution);
        assert_eq!(log[0].record_id, contribution.id);
    }

    #[test]
    fn delete_missing_row_rolls_back_audit_entry() {
        let (mut conn, _) = get_connection_with_project();

        let result = delete_special_contribution(42, "sam", "no such entry", &mut conn);

        assert_eq!(result, Err(Error::DeleteMissingSpecialContribution));
        assert!(get_deletion_log(&conn).unwrap().is_empty());
    }

    #[test]
    fn delete_with_empty_reason_changes_nothing() {
        let (mut conn, project_id) = get_connection_with_project();
        let contribution = add_special_contribution(project_id, "Alice", 4.17, "", &conn).unwrap();

        let result = delete_special_contribution(contribution.id, "sam", "", &mut conn);

        assert_eq!(result, Err(Error::EmptyDeletionReason));
        assert_eq!(get_special_contributions(project_id, &conn).unwrap().len(), 1);
        assert!(get_deletion_log(&conn).unwrap().is_empty());
    }
}
