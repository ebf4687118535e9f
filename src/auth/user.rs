//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// The role a user was assigned at registration.
///
/// The first user to ever register becomes the admin, everyone after is a
/// viewer. Roles are never changed by the application once assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Can create and delete financial entries and read the deletion log.
    Admin,
    /// Can only read the contribution and project pages.
    Viewer,
}

impl Role {
    /// The string stored in the database for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            other => Err(FromSqlError::Other(
                format!("unknown role \"{other}\"").into(),
            )),
        }
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The unique name the user logs in with.
    pub username: String,
    /// The user's display name.
    pub name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's email address, used for password resets.
    pub email: String,
    /// The role assigned at registration.
    pub role: Role,
}

/// The details needed to register a user. The role is decided at insert time.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The unique name the user will log in with.
    pub username: String,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The hash of the user's chosen password.
    pub password_hash: PasswordHash,
}

/// Create the users table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                password TEXT NOT NULL,
                email TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The first user ever inserted is assigned [Role::Admin], every user after
/// that is assigned [Role::Viewer]. The count and the insert happen inside
/// one transaction so two racing registrations cannot both become admin.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateUsername] if the username is already registered,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &mut Connection) -> Result<User, Error> {
    let transaction = connection.transaction()?;

    let user_count: i64 =
        transaction.query_row("SELECT COUNT(username) FROM users", [], |row| row.get(0))?;

    let role = if user_count == 0 {
        Role::Admin
    } else {
        Role::Viewer
    };

    transaction
        .execute(
            "INSERT INTO users (username, name, password, email, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &new_user.username,
                &new_user.name,
                new_user.password_hash.as_ref(),
                &new_user.email,
                role,
                OffsetDateTime::now_utc(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code:
                        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateUsername(new_user.username.clone()),
            error => error.into(),
        })?;

    transaction.commit()?;

    Ok(User {
        username: new_user.username,
        name: new_user.name,
        password_hash: new_user.password_hash,
        email: new_user.email,
        role,
    })
}

/// Get the user with an exactly matching `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT username, name, password, email, role FROM users WHERE username = :username",
        )?
        .query_one(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the role of the user matching `username`, ignoring case.
///
/// Returns `None` if no user matches.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_role(username: &str, connection: &Connection) -> Result<Option<Role>, Error> {
    let mut statement = connection
        .prepare("SELECT role FROM users WHERE LOWER(username) = LOWER(:username)")?;
    let mut rows = statement.query(&[(":username", &username)])?;

    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

/// Check whether a user with exactly matching `username` already exists.
///
/// Note that the uniqueness check is case-sensitive while the role and email
/// lookups are not, matching the long-standing behavior of the app.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn username_exists(username: &str, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(username) FROM users WHERE username = :username",
        &[(":username", &username)],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(username) FROM users;", [], |row| {
            Ok(row.get::<_, i64>(0)? as usize)
        })
        .map_err(|error| error.into())
}

/// Check whether `username` and `email` match an existing record, ignoring
/// case on both. Used to gate password resets.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn verify_user_email(
    username: &str,
    email: &str,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(username) FROM users
         WHERE LOWER(username) = LOWER(:username) AND LOWER(email) = LOWER(:email)",
        &[(":username", &username), (":email", &email)],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Replace the password hash for the user matching `username`, ignoring case.
///
/// # Errors
///
/// Returns a:
/// - [Error::NotFound] if no user matches `username`,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn update_password(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE users SET password = :password WHERE LOWER(username) = LOWER(:username)",
        &[
            (":password", &password_hash.to_string()),
            (":username", &username.to_owned()),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        username: row.get(0)?,
        name: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        email: row.get(3)?,
        role: row.get(4)?,
    })
}
