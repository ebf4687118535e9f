//! Database initialization for the application's SQLite store.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, contribution::create_contribution_table,
    deletion_log::create_deletion_log_table, project::create_special_project_table,
    project_income::create_project_income_table,
    special_contribution::create_special_contribution_table,
};

/// Create the application's tables if they do not already exist.
///
/// Also enables SQLite foreign key enforcement on `connection`, which the
/// cascade deletes between special projects and their entries rely on.
///
/// # Errors
/// Returns an error if any of the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign keys are off by default in SQLite and the setting is
    // per-connection, so it must be set before anything else runs.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_contribution_table(&transaction)?;
    create_special_project_table(&transaction)?;
    create_special_contribution_table(&transaction)?;
    create_project_income_table(&transaction)?;
    create_deletion_log_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                ('users', 'contributions', 'special_projects', 'special_contributions',
                'project_income', 'deletion_logs')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 6);
    }

    #[test]
    fn is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();
        initialize(&conn).unwrap();
    }

    #[test]
    fn enables_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        let foreign_keys: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(foreign_keys, 1);
    }
}
