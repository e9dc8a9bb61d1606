//! Aggregated statistics and spending projections over transactions.
//!
//! This module contains:
//! - Pure aggregation functions over transaction lists
//! - Linear extrapolation of month-to-date spending
//! - Route handlers for the statistics and projection endpoints

mod aggregation;
mod endpoint;
mod projection;

pub use aggregation::{
    category_breakdown, monthly_filter, monthly_totals, savings_rate, total_by_type,
};
pub use endpoint::{
    SpendingProjection, StatsState, TransactionStats, get_spending_projection,
    get_transaction_stats,
};
pub use projection::{DEFAULT_WARNING_THRESHOLD, MonthlyProjection, project};
