//! Defines the user model and its database queries.
//!
//! A user owns transactions and logs in with an email and password.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseID, password::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(DatabaseID);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: DatabaseID) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The ID of the user.
    pub id: UserID,
    /// The email address the user registered and logs in with.
    pub email: String,
    /// The user's salted and hashed password.
    pub password_hash: PasswordHash,
}

/// The public view of a [User] returned by the registration and log-in
/// endpoints. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    /// The ID of the user.
    pub id: UserID,
    /// The email address the user registered with.
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Check that `email` looks like an email address.
///
/// This only checks for a single '@' with non-empty text on both sides.
/// Properly validating an email address means sending an email to it, which
/// is out of scope for this function.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if the check fails.
pub fn validate_email(email: &str) -> Result<(), Error> {
    let mut parts = email.split('@');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::InvalidEmail(email.to_owned())),
    }
}

/// Create the user table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create a new user in the database with the given email and password hash.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidEmail] if `email` does not look like an email address,
/// - or [Error::DuplicateEmail] if a user with `email` already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    validate_email(email)?;

    connection.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (email, password_hash.as_ref()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(User {
        id: UserID::new(id),
        email: email.to_owned(),
        password_hash,
    })
}

/// Retrieve a user from the database by their `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not refer to a valid user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare("SELECT id, email, password FROM user WHERE id = :id")?
        .query_one(&[(":id", &user_id.as_i64())], map_user_row)?;

    Ok(user)
}

/// Retrieve a user from the database by their `email`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no user registered with `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_one(&[(":email", &email)], map_user_row)?;

    Ok(user)
}

/// Get the total number of users in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| {
            row.get::<_, i64>(0).map(|count| count as usize)
        })
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = row.get(0)?;
    let email = row.get(1)?;
    let password: String = row.get(2)?;

    Ok(User {
        id: UserID::new(id),
        email,
        password_hash: PasswordHash::new_unchecked(&password),
    })
}
