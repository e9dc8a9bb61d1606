//! CSV export of a user's transaction history.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use rusqlite::Connection;
use time::macros::format_description;

use crate::{AppState, Error, transaction::get_transactions, user::UserID};

/// The state needed for the export endpoint.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The file name suggested to the client for the downloaded CSV.
const EXPORT_FILE_NAME: &str = "transactions.csv";

/// Handler for downloading the logged in user's transactions as CSV.
///
/// The document has a header row followed by one row per transaction, most
/// recent first. Missing notes are written as an empty field.
///
/// # Errors
///
/// Returns an error response if the database query fails or if the CSV
/// document cannot be produced.
pub async fn export_transactions(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");
        get_transactions(user_id, &connection)?
    };

    let date_format = format_description!("[year]-[month]-[day]");
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "type", "category", "amount", "notes"])
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in &transactions {
        let date_text = transaction
            .date
            .format(&date_format)
            .map_err(|error| Error::CsvError(error.to_string()))?;

        writer
            .write_record([
                date_text.as_str(),
                transaction.transaction_type.as_str(),
                &transaction.category,
                &transaction.amount.to_string(),
                transaction.notes.as_deref().unwrap_or(""),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let csv_bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;
    let csv_text =
        String::from_utf8(csv_bytes).map_err(|error| Error::CsvError(error.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv_text,
    ))
}

#[cfg(test)]
mod export_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints,
        password::PasswordHash,
        transaction::{NewTransaction, TransactionType, create_transaction},
        user::{UserID, create_user},
    };

    use super::{EXPORT_FILE_NAME, ExportState, export_transactions};

    fn get_test_server() -> (TestServer, ExportState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hash"),
            &connection,
        )
        .expect("Could not create test user")
        .id;

        let state = ExportState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route(endpoints::EXPORT, get(export_transactions))
            .layer(Extension(user_id))
            .with_state(state.clone());

        (
            TestServer::new(app),
            state,
            user_id,
        )
    }

    #[tokio::test]
    async fn export_returns_csv_attachment() {
        let (server, state, user_id) = get_test_server();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                NewTransaction {
                    date: date!(2024 - 03 - 10),
                    transaction_type: TransactionType::Expense,
                    category: "food".to_owned(),
                    amount: 12.5,
                    notes: Some("lunch".to_owned()),
                },
                user_id,
                &connection,
            )
            .expect("Could not create transaction");
            create_transaction(
                NewTransaction {
                    date: date!(2024 - 03 - 12),
                    transaction_type: TransactionType::Income,
                    category: "salary".to_owned(),
                    amount: 100.0,
                    notes: None,
                },
                user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }

        let response = server.get(endpoints::EXPORT).await;

        response.assert_status_ok();
        let headers = response.headers();
        assert_eq!(
            headers.get("content-type").map(|value| value.as_bytes()),
            Some("text/csv".as_bytes())
        );
        let content_disposition = headers
            .get("content-disposition")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(
            content_disposition.contains(EXPORT_FILE_NAME),
            "got content disposition {content_disposition:?}"
        );

        let text = response.text();
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        assert_eq!(lines[0], "date,type,category,amount,notes");
        assert_eq!(lines[1], "2024-03-12,income,salary,100,");
        assert_eq!(lines[2], "2024-03-10,expense,food,12.5,lunch");
    }

    #[tokio::test]
    async fn export_with_no_transactions_has_header_only() {
        let (server, _, _) = get_test_server();

        let response = server.get(endpoints::EXPORT).await;

        response.assert_status_ok();
        assert_eq!(response.text().trim_end(), "date,type,category,amount,notes");
    }
}
