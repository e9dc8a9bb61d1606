//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionID, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brings money in or takes money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. a salary payment.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The text stored in the database for this transaction type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category of the transaction, e.g. "groceries", "rent", "salary".
    pub category: String,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Amounts are always positive, the direction of the money flow is given
    /// by `transaction_type`.
    pub amount: f64,
    /// Free-form notes about the transaction.
    pub notes: Option<String>,
}

/// The fields of a transaction before it has been written to the database.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category of the transaction.
    pub category: String,
    /// The amount of money spent or earned, must be greater than zero.
    pub amount: f64,
    /// Free-form notes about the transaction.
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Check that the transaction data can be stored.
    ///
    /// `today` should be the current date in the server's local timezone.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - or [Error::EmptyCategory] if the category is empty or whitespace,
    /// - or [Error::FutureDate] if the date is after `today`. Transactions
    ///   record events that have already happened, therefore future dates are
    ///   not allowed.
    pub fn validate(&self, today: Date) -> Result<(), Error> {
        if self.amount <= 0.0 {
            return Err(Error::NonPositiveAmount(self.amount));
        }

        if self.category.trim().is_empty() {
            return Err(Error::EmptyCategory);
        }

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                notes TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Covers the per-user list query and the month filters.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction owned by `user_id` in the database.
///
/// The caller is expected to have checked the fields with
/// [NewTransaction::validate] first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, date, type, category, amount, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, date, type, category, amount, notes",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.date,
                new_transaction.transaction_type.as_str(),
                new_transaction.category,
                new_transaction.amount,
                new_transaction.notes,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all transactions owned by `user_id`, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, date, type, category, amount, notes
             FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|transaction| transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the expense transactions of `user_id` in `category`, most recent
/// first.
///
/// Income transactions are excluded, the result backs spending statistics.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_expenses_by_category(
    user_id: UserID,
    category: &str,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, date, type, category, amount, notes
             FROM \"transaction\"
             WHERE user_id = :user_id AND category = :category AND type = 'expense'
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":category", &category),
            ],
            map_transaction_row,
        )?
        .map(|transaction| transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let date = row.get(2)?;
    let type_text: String = row.get(3)?;
    let category = row.get(4)?;
    let amount = row.get(5)?;
    let notes = row.get(6)?;

    let transaction_type = match type_text.as_str() {
        "income" => TransactionType::Income,
        "expense" => TransactionType::Expense,
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                3,
                Type::Text,
                format!("invalid transaction type {other:?}").into(),
            ));
        }
    };

    Ok(Transaction {
        id,
        user_id: UserID::new(user_id),
        date,
        transaction_type,
        category,
        amount,
        notes,
    })
}

// ============================================================================
// TESTS
// ============================================================================
