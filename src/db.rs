//! Database initialization for the application.

use rusqlite::Connection;

use crate::{Error, transaction::create_transaction_table, user::create_user_table};

/// Create the application's database tables if they do not exist.
///
/// # Errors
///
/// Returns [Error::SqlError] if the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_user_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}
