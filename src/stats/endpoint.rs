//! Route handlers for transaction statistics and spending projections.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::{UtcOffset, macros::format_description};

use crate::{
    AppState, Error,
    stats::{
        aggregation::{category_breakdown, monthly_filter, monthly_totals, savings_rate, total_by_type},
        projection::{MonthlyProjection, project},
    },
    timezone::get_local_date,
    transaction::{
        TransactionQuery, TransactionType, get_expenses_by_category, get_transactions,
        parse_month_param,
    },
    user::UserID,
};

/// The state needed for the statistics and projection endpoints.
#[derive(Debug, Clone)]
pub struct StatsState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used to resolve the current date.
    pub local_timezone: UtcOffset,
    /// The fraction of the predicted monthly spend at which the projection
    /// warning flag trips.
    pub warning_threshold: f64,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone,
            warning_threshold: state.warning_threshold,
        }
    }
}

/// Summary statistics over a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionStats {
    /// The sum of all income transactions.
    pub total_income: f64,
    /// The sum of all expense transactions.
    pub total_expenses: f64,
    /// The percentage of income left over after expenses. Zero when there is
    /// no income.
    pub savings_rate: f64,
    /// Expense totals grouped by category.
    pub category_breakdown: HashMap<String, f64>,
}

/// Handler for summarising the logged in user's transactions.
///
/// The optional `month` query parameter ("YYYY-MM") restricts the statistics
/// to a single calendar month.
///
/// # Errors
///
/// Returns an error response if the month parameter is malformed or if the
/// database query fails.
pub async fn get_transaction_stats(
    State(state): State<StatsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionStats>, Error> {
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

    let total_income = total_by_type(&transactions, TransactionType::Income);
    let total_expenses = total_by_type(&transactions, TransactionType::Expense);

    Ok(Json(TransactionStats {
        total_income,
        total_expenses,
        savings_rate: savings_rate(total_income, total_expenses),
        category_breakdown: category_breakdown(&transactions),
    }))
}

/// A spending projection for one category, including the month-by-month
/// history the client charts alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingProjection {
    /// The category the projection is for.
    pub category: String,
    /// The projection for the current calendar month.
    #[serde(flatten)]
    pub projection: MonthlyProjection,
    /// Past expense totals for the category keyed by month ("YYYY-MM").
    pub historical_monthly_totals: BTreeMap<String, f64>,
}

/// Handler for projecting the current month's spending in one category.
///
/// The projection extrapolates the month-to-date spend linearly to the end of
/// the month, using today's date in the server's local timezone.
///
/// # Errors
///
/// Returns an error response if the database query fails.
pub async fn get_spending_projection(
    State(state): State<StatsState>,
    Extension(user_id): Extension<UserID>,
    Path(category): Path<String>,
) -> Result<Json<SpendingProjection>, Error> {
    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");
        get_expenses_by_category(user_id, &category, &connection)?
    };

    let today = get_local_date(state.local_timezone);
    let current_spending: f64 = monthly_filter(&expenses, today)
        .iter()
        .map(|transaction| transaction.amount)
        .sum();
    let projection = project(current_spending, today, state.warning_threshold);

    let month_format = format_description!("[year]-[month]");
    let mut historical_monthly_totals = BTreeMap::new();
    for (month, total) in monthly_totals(&expenses) {
        let key = month
            .format(&month_format)
            .map_err(|error| Error::SerializationError(error.to_string()))?;
        historical_monthly_totals.insert(key, total);
    }

    Ok(Json(SpendingProjection {
        category,
        projection,
        historical_monthly_totals,
    }))
}
