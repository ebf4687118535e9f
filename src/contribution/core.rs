//! Defines the core data model and database queries for monthly contributions.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::ContributionId,
    deletion_log::{RecordType, record_deletion},
};

/// A monthly contribution made by a club member.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    /// The ID of the contribution.
    pub id: ContributionId,
    /// The name of the member who contributed.
    pub member: String,
    /// The normalized amount contributed.
    pub amount: f64,
    /// The month the contribution is for, as entered, e.g. "January 2025".
    pub month: String,
    /// When the contribution was recorded.
    pub date: OffsetDateTime,
}

/// Create the contributions table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_contribution_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS contributions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                member TEXT NOT NULL,
                amount REAL NOT NULL,
                month TEXT NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create a new contribution in the database.
///
/// The caller is expected to have validated the inputs and normalized
/// `amount`; the store trusts both.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_contribution(
    member: &str,
    amount: f64,
    month: &str,
    connection: &Connection,
) -> Result<Contribution, Error> {
    let contribution = connection
        .prepare(
            "INSERT INTO contributions (member, amount, month, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, member, amount, month, date",
        )?
        .query_row(
            (member, amount, month, OffsetDateTime::now_utc()),
            map_contribution_row,
        )?;

    Ok(contribution)
}

/// Retrieve all contributions, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_contributions(connection: &Connection) -> Result<Vec<Contribution>, Error> {
    connection
        .prepare(
            "SELECT id, member, amount, month, date
             FROM contributions
             ORDER BY date DESC, id DESC",
        )?
        .query_map([], map_contribution_row)?
        .map(|maybe_contribution| maybe_contribution.map_err(Error::SqlError))
        .collect()
}

/// Delete a contribution, writing the audit row in the same transaction.
///
/// Either both the deletion log row and the delete persist, or neither does.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDeletionReason] if `reason` is empty or whitespace,
/// - [Error::DeleteMissingContribution] if `id` does not refer to a contribution,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_contribution(
    id: ContributionId,
    deleted_by: &str,
    reason: &str,
    connection: &mut Connection,
) -> Result<(), Error> {
    let transaction = connection.transaction()?;

    record_deletion(RecordType::Contribution, id, deleted_by, reason, &transaction)?;

    let rows_affected =
        transaction.execute("DELETE FROM contributions WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        // Dropping the transaction without committing rolls back the audit row.
        return Err(Error::DeleteMissingContribution);
    }

    transaction.commit()?;

    Ok(())
}

/// Map a database row to a Contribution.
pub(crate) fn map_contribution_row(row: &Row) -> Result<Contribution, rusqlite::Error> {
    Ok(Contribution {
        id: row.get(0)?,
        member: row.get(1)?,
        amount: row.get(2)?,
        month: row.get(3)?,
        date: row.get(4)?,
    })
}

#[cfg(test)]
mod contribution_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        deletion_log::{RecordType, get_deletion_log},
    };

    use super::{create_contribution, delete_contribution, get_all_contributions};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let contribution =
            create_contribution("Alice", 8.33, "January 2025", &conn).unwrap();

        assert!(contribution.id > 0);
        assert_eq!(contribution.member, "Alice");
        assert_eq!(contribution.amount, 8.33);
        assert_eq!(contribution.month, "January 2025");
    }

    #[test]
    fn get_all_returns_newest_first() {
        let conn = get_test_connection();
        create_contribution("Alice", 1.0, "January 2025", &conn).unwrap();
        create_contribution("Bob", 2.0, "January 2025", &conn).unwrap();

        let contributions = get_all_contributions(&conn).unwrap();

        assert_eq!(contributions.len(), 2);
        assert_eq!(contributions[0].member, "Bob");
        assert_eq!(contributions[1].member, "Alice");
    }

    #[test]
    fn delete_removes_row_and_writes_audit_entry() {
        let mut conn = get_test_connection();
        let contribution = create_contribution("Alice", 8.33, "January 2025", &conn).unwrap();

        delete_contribution(contribution.id, "sam", "entered twice", &mut conn).unwrap();

        assert!(get_all_contributions(&conn).unwrap().is_empty());

        let log = get_deletion_log(&conn).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].record_type, RecordType::Contribution);
        assert_eq!(log[0].record_id, contribution.id);
        assert_eq!(log[0].deleted_by, "sam");
        assert_eq!(log[0].reason, "entered twice");
    }

    #[test]
    fn delete_missing_contribution_rolls_back_audit_entry() {
        let mut conn = get_test_connection();

        let result = delete_contribution(42, "sam", "no such entry", &mut conn);

        assert_eq!(result, Err(Error::DeleteMissingContribution));
        // The audit row written before the failed delete must not survive.
        assert!(get_deletion_log(&conn).unwrap().is_empty());
    }

    #[test]
    fn delete_with_empty_reason_changes_nothing() {
        let mut conn = get_test_connection();
        let contribution = create_contribution("Alice", 8.33, "January 2025", &conn).unwrap();

        let result = delete_contribution(contribution.id, "sam", "   ", &mut conn);

        assert_eq!(result, Err(Error::EmptyDeletionReason));
        assert_eq!(get_all_contributions(&conn).unwrap().len(), 1);
        assert!(get_deletion_log(&conn).unwrap().is_empty());
    }
}
