//! Route handlers for listing and creating transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month, UtcOffset};

use crate::{
    AppState, Error,
    stats::monthly_filter,
    timezone::get_local_date,
    transaction::{NewTransaction, Transaction, create_transaction, get_transactions},
    user::UserID,
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used to resolve "today" when validating dates.
    pub local_timezone: UtcOffset,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone,
        }
    }
}

/// The query parameters accepted by the transaction list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionQuery {
    /// Restrict the result to one calendar month, formatted as "YYYY-MM".
    pub month: Option<String>,
}

/// Parse a "YYYY-MM" query parameter into the first day of that month.
///
/// # Errors
///
/// Returns [Error::InvalidMonth] if `text` is not a valid year and month.
pub fn parse_month_param(text: &str) -> Result<Date, Error> {
    let error = || Error::InvalidMonth(text.to_owned());

    let (year_text, month_text) = text.split_once('-').ok_or_else(error)?;
    let year: i32 = year_text.parse().map_err(|_| error())?;
    let month_number: u8 = month_text.parse().map_err(|_| error())?;
    let month = Month::try_from(month_number).map_err(|_| error())?;

    Date::from_calendar_date(year, month, 1).map_err(|_| error())
}

/// Handler for creating a transaction via the POST method.
///
/// The transaction is owned by the logged in user and validated against
/// today's date in the server's local timezone.
///
/// # Errors
///
/// Returns an error response if the transaction data fails validation (see
/// [NewTransaction::validate]) or if the database query fails.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let today = get_local_date(state.local_timezone);
    new_transaction.validate(today)?;

    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire lock to database connection");
    let transaction = create_transaction(new_transaction, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Handler for listing the logged in user's transactions.
///
/// Transactions are returned most recent first. The optional `month` query
/// parameter ("YYYY-MM") restricts the result to a single calendar month.
///
/// # Errors
///
/// Returns an error response if the month parameter is malformed or if the
/// database query fails.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");
        get_transactions(user_id, &connection)?
    };

    let transactions = match query.month {
        Some(month_text) => {
            let reference_date = parse_month_param(&month_text)?;
            monthly_filter(&transactions, reference_date)
        }
        None => transactions,
    };

    Ok(Json(transactions))
}


#[cfg(test)]
mod transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::{Query, State}, http::StatusCode};
    use rusqlite::Connection;
    use time::{Date, OffsetDateTime, UtcOffset, macros::date};

    use crate::{
        Error,
        db::initialize,
        password::PasswordHash,
        transaction::{NewTransaction, TransactionType},
        user::{UserID, create_user},
    };

    use super::{TransactionQuery, TransactionState, create_transaction_endpoint, get_transactions_endpoint};

    fn get_test_state() -> (TransactionState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hash"),
            &connection,
        )
        .expect("Could not create test user")
        .id;

        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: UtcOffset::UTC,
        };

        (state, user_id)
    }

    fn today() -> Date {
        OffsetDateTime::now_utc().date()
    }

    fn new_test_transaction(date: Date, amount: f64) -> NewTransaction {
        NewTransaction {
            date,
            transaction_type: TransactionType::Expense,
            category: "food".to_owned(),
            amount,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_returns_created_transaction() {
        let (state, user_id) = get_test_state();

        let result = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Json(new_test_transaction(today(), 50.0)),
        )
        .await;

        match result {
            Ok((status, Json(transaction))) => {
                assert_eq!(status, StatusCode::CREATED);
                assert_eq!(transaction.amount, 50.0);
                assert_eq!(transaction.user_id, user_id);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[tokio::test]
    async fn create_rejects_future_date() {
        let (state, user_id) = get_test_state();
        let future_date = today().next_day().expect("Could not get tomorrow's date");

        let result = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Json(new_test_transaction(future_date, 50.0)),
        )
        .await;

        assert!(matches!(result, Err(Error::FutureDate(_))));
    }

    #[tokio::test]
    async fn list_returns_all_transactions() {
        let (state, user_id) = get_test_state();
        for amount in [10.0, 20.0] {
            create_transaction_endpoint(
                State(state.clone()),
                Extension(user_id),
                Json(new_test_transaction(today(), amount)),
            )
            .await
            .expect("Could not create transaction");
        }

        let Json(transactions) = get_transactions_endpoint(
            State(state),
            Extension(user_id),
            Query(TransactionQuery { month: None }),
        )
        .await
        .expect("Could not list transactions");

        assert_eq!(transactions.len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_month() {
        let (state, user_id) = get_test_state();
        create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Json(new_test_transaction(date!(2024 - 03 - 10), 10.0)),
        )
        .await
        .expect("Could not create transaction");
        create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Json(new_test_transaction(date!(2024 - 04 - 10), 20.0)),
        )
        .await
        .expect("Could not create transaction");

        let Json(transactions) = get_transactions_endpoint(
            State(state),
            Extension(user_id),
            Query(TransactionQuery {
                month: Some("2024-03".to_owned()),
            }),
        )
        .await
        .expect("Could not list transactions");

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].date, date!(2024 - 03 - 10));
    }

    #[tokio::test]
    async fn list_rejects_malformed_month() {
        let (state, user_id) = get_test_state();

        let result = get_transactions_endpoint(
            State(state),
            Extension(user_id),
            Query(TransactionQuery {
                month: Some("not-a-month".to_owned()),
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidMonth(_))));
    }
}
