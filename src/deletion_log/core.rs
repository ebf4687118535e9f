//! Defines the core data model and database queries for the deletion log.
//!
//! Rows are only ever inserted, and only from inside the transaction that
//! performs the matching delete. Nothing in the application updates or
//! removes them.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId};

/// The kind of financial entry a deletion log row refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    /// A monthly contribution.
    Contribution,
    /// A contribution to a special project.
    SpecialContribution,
    /// An income entry for a special project.
    ProjectIncome,
}

impl RecordType {
    /// The string stored in the database for this record type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Contribution => "contribution",
            RecordType::SpecialContribution => "special_contribution",
            RecordType::ProjectIncome => "project_income",
        }
    }

    /// A human readable label for the deletion log page.
    pub fn label(&self) -> &'static str {
        match self {
            RecordType::Contribution => "Monthly contribution",
            RecordType::SpecialContribution => "Project contribution",
            RecordType::ProjectIncome => "Project income",
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for RecordType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RecordType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "contribution" => Ok(RecordType::Contribution),
            "special_contribution" => Ok(RecordType::SpecialContribution),
            "project_income" => Ok(RecordType::ProjectIncome),
            other => Err(FromSqlError::Other(
                format!("unknown record type \"{other}\"").into(),
            )),
        }
    }
}

/// A single row of the deletion audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionLogEntry {
    /// The ID of the log row itself.
    pub id: DatabaseId,
    /// The kind of entry that was deleted.
    pub record_type: RecordType,
    /// The ID the deleted entry had.
    pub record_id: DatabaseId,
    /// The username of the admin who deleted the entry.
    pub deleted_by: String,
    /// The reason they gave.
    pub reason: String,
    /// When the deletion happened.
    pub deleted_at: OffsetDateTime,
}

/// Create the deletion log table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_deletion_log_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS deletion_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                record_type TEXT NOT NULL,
                record_id INTEGER NOT NULL,
                deleted_by TEXT NOT NULL,
                reason TEXT NOT NULL,
                deleted_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert an audit row for a deleted entry.
///
/// Callers must run this inside the same transaction as the delete statement
/// it describes, so `connection` is typically a [rusqlite::Transaction].
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDeletionReason] if `reason` is empty or whitespace,
/// - [Error::SqlError] if there is some other SQL error.
pub fn record_deletion(
    record_type: RecordType,
    record_id: DatabaseId,
    deleted_by: &str,
    reason: &str,
    connection: &Connection,
) -> Result<(), Error> {
    if reason.trim().is_empty() {
        return Err(Error::EmptyDeletionReason);
    }

    connection.execute(
        "INSERT INTO deletion_logs (record_type, record_id, deleted_by, reason, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            record_type,
            record_id,
            deleted_by,
            reason,
            OffsetDateTime::now_utc(),
        ),
    )?;

    Ok(())
}

/// Retrieve the full deletion log, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_deletion_log(connection: &Connection) -> Result<Vec<DeletionLogEntry>, Error> {
    connection
        .prepare(
            "SELECT id, record_type, record_id, deleted_by, reason, deleted_at
             FROM deletion_logs
             ORDER BY deleted_at DESC, id DESC",
        )?
        .query_map([], map_deletion_log_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::SqlError))
        .collect()
}

/// Map a database row to a DeletionLogEntry.
fn map_deletion_log_row(row: &Row) -> Result<DeletionLogEntry, rusqlite::Error> {
    Ok(DeletionLogEntry {
        id: row.get(0)?,
        record_type: row.get(1)?,
        record_id: row.get(2)?,
        deleted_by: row.get(3)?,
        reason: row.get(4)?,
        deleted_at: row.get(5)?,
    })
}
