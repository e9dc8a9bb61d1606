//! Type aliases for row IDs in the application database.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// The ID of a row in the transaction table.
pub type TransactionID = DatabaseID;
