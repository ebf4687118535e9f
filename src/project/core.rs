//! Defines the core data model and database queries for special projects.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{Error, database_id::ProjectId};

/// An ad-hoc fundraising project, tracked separately from monthly dues.
///
/// Projects are never deleted through the app. Removing one at the SQL level
/// cascades to its contributions and income entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialProject {
    /// The ID of the project.
    pub id: ProjectId,
    /// The project's name.
    pub name: String,
    /// A free-text description.
    pub description: String,
    /// The normalized fundraising target.
    pub target_amount: f64,
    /// An optional deadline.
    pub deadline: Option<Date>,
    /// The project status. New projects start as "active".
    pub status: String,
    /// Whether a document is attached to the project.
    pub has_document: bool,
}

/// The details needed to create a special project.
#[derive(Debug, Clone, Default)]
pub struct NewSpecialProject {
    /// The project's name.
    pub name: String,
    /// A free-text description.
    pub description: String,
    /// The normalized fundraising target.
    pub target_amount: f64,
    /// An optional deadline.
    pub deadline: Option<Date>,
    /// An optional uploaded document.
    pub document: Option<Vec<u8>>,
}

/// Create the special projects table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_special_project_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS special_projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_name TEXT NOT NULL,
                description TEXT NOT NULL,
                target_amount REAL NOT NULL,
                deadline TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                document BLOB
                )",
        (),
    )?;

    Ok(())
}

/// Create a new special project in the database and return its generated ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_special_project(
    new_project: NewSpecialProject,
    connection: &Connection,
) -> Result<ProjectId, Error> {
    let project_id = connection
        .prepare(
            "INSERT INTO special_projects (project_name, description, target_amount, deadline, document)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )?
        .query_row(
            (
                new_project.name,
                new_project.description,
                new_project.target_amount,
                new_project.deadline,
                new_project.document,
            ),
            |row| row.get(0),
        )?;

    Ok(project_id)
}

/// Retrieve all special projects, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_special_projects(connection: &Connection) -> Result<Vec<SpecialProject>, Error> {
    connection
        .prepare(
            "SELECT id, project_name, description, target_amount, deadline, status,
                    document IS NOT NULL
             FROM special_projects
             ORDER BY id DESC",
        )?
        .query_map([], map_special_project_row)?
        .map(|maybe_project| maybe_project.map_err(Error::SqlError))
        .collect()
}

/// Retrieve the document attached to a project, if any.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid project,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_project_document(
    id: ProjectId,
    connection: &Connection,
) -> Result<Option<Vec<u8>>, Error> {
    connection
        .prepare("SELECT document FROM special_projects WHERE id = :id")?
        .query_one(&[(":id", &id)], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Map a database row to a SpecialProject.
fn map_special_project_row(row: &Row) -> Result<SpecialProject, rusqlite::Error> {
    Ok(SpecialProject {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        target_amount: row.get(3)?,
        deadline: row.get(4)?,
        status: row.get(5)?,
        has_document: row.get(6)?,
    })
}
