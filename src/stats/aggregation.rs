//! Pure summarisation logic over a collection of transactions.
//!
//! These functions back the statistics and prediction endpoints. They take
//! already-fetched transaction rows and never touch the database, so the
//! handlers stay in charge of I/O and these stay trivially testable.

use std::collections::HashMap;

use time::Date;

use crate::transaction::{Transaction, TransactionType};

/// Sum the amounts of all transactions matching `transaction_type`.
///
/// Returns zero for an empty slice.
pub fn total_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == transaction_type)
        .map(|transaction| transaction.amount)
        .sum()
}

/// Sum expense amounts grouped by category.
///
/// Income transactions are ignored. Categories with no expense transactions
/// in `transactions` do not appear in the result.
pub fn category_breakdown(transactions: &[Transaction]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        if transaction.transaction_type != TransactionType::Expense {
            continue;
        }

        *totals.entry(transaction.category.clone()).or_insert(0.0) += transaction.amount;
    }

    totals
}

/// The percentage of income left over after expenses.
///
/// Returns zero when `income` is zero so that callers never see a division
/// by zero. Zero income with non-zero expenses arguably has an undefined
/// savings rate, but the clients display this value directly and cannot
/// render NaN or infinity.
pub fn savings_rate(income: f64, expenses: f64) -> f64 {
    if income <= 0.0 {
        return 0.0;
    }

    (income - expenses) / income * 100.0
}

/// Keep only the transactions dated in the same calendar month and year as
/// `reference_date`.
pub fn monthly_filter(transactions: &[Transaction], reference_date: Date) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.date.year() == reference_date.year()
                && transaction.date.month() == reference_date.month()
        })
        .cloned()
        .collect()
}

/// Sum transaction amounts grouped by calendar month.
///
/// The keys are the first day of each month so that they sort chronologically.
pub fn monthly_totals(transactions: &[Transaction]) -> HashMap<Date, f64> {
    let mut totals: HashMap<Date, f64> = HashMap::new();

    for transaction in transactions {
        let month = transaction
            .date
            .replace_day(1)
            .expect("day 1 is valid for every month");
        *totals.entry(month).or_insert(0.0) += transaction.amount;
    }

    totals
}
