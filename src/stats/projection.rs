//! Linear extrapolation of month-to-date spending to a full-month estimate.

use serde::Serialize;
use time::Date;

/// The fraction of the predicted monthly spend at which the warning flag is
/// raised.
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.8;

/// A forward-looking estimate of one category's spending for the current
/// calendar month.
///
/// `projected_total` always equals `predicted_monthly`. Existing clients read
/// both names, so both are kept on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyProjection {
    /// The estimated spend for the whole month.
    pub predicted_monthly: f64,
    /// The amount spent so far this month.
    pub current_spending: f64,
    /// The estimated spend for the rest of the month.
    pub predicted_remaining: f64,
    /// Duplicate of `predicted_monthly` (see struct docs).
    pub projected_total: f64,
    /// How far through the calendar month `reference_date` is, as a
    /// percentage in `[0, 100]`.
    pub month_progress: f64,
    /// Whether spending is on track to exceed the warning threshold.
    pub warning: bool,
}

/// Estimate the full-month spend from `current_spending` as of
/// `reference_date`.
///
/// The estimate assumes spending continues at the month-to-date daily rate:
/// `current_spending / day_of_month * days_in_month`, with the real month
/// length so that leap years are handled. `warning_threshold` is the fraction
/// of the predicted monthly spend at which the warning flag trips (see
/// [DEFAULT_WARNING_THRESHOLD]); the flag is also forced on whenever spending
/// has already passed the prediction outright.
pub fn project(
    current_spending: f64,
    reference_date: Date,
    warning_threshold: f64,
) -> MonthlyProjection {
    let days_in_month = reference_date.month().length(reference_date.year()) as f64;
    let day_of_month = reference_date.day() as f64;

    let month_progress = (day_of_month / days_in_month * 100.0).clamp(0.0, 100.0);

    let predicted_monthly = if day_of_month > 0.0 {
        current_spending / day_of_month * days_in_month
    } else {
        current_spending
    };
    let predicted_remaining = predicted_monthly - current_spending;

    let warning = current_spending > 0.0
        && (current_spending >= warning_threshold * predicted_monthly
            || current_spending > predicted_monthly);

    MonthlyProjection {
        predicted_monthly,
        current_spending,
        predicted_remaining,
        projected_total: predicted_monthly,
        month_progress,
        warning,
    }
}

#[cfg(test)]
mod projection_tests {
    use time::macros::date;

    use super::{DEFAULT_WARNING_THRESHOLD, project};

    #[track_caller]
    fn assert_float_eq(got: f64, want: f64) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }

    #[test]
    fn zero_spending_projects_zero() {
        let projection = project(0.0, date!(2024 - 03 - 15), DEFAULT_WARNING_THRESHOLD);

        assert_eq!(projection.predicted_monthly, 0.0);
        assert_eq!(projection.predicted_remaining, 0.0);
        assert_eq!(projection.projected_total, 0.0);
        assert!(!projection.warning);
    }

    #[test]
    fn midmonth_spending_doubles_in_thirty_day_month() {
        // April has 30 days, so day 15 is exactly halfway.
        let projection = project(500.0, date!(2024 - 04 - 15), DEFAULT_WARNING_THRESHOLD);

        assert_float_eq(projection.predicted_monthly, 1000.0);
        assert_float_eq(projection.month_progress, 50.0);
        assert_float_eq(projection.predicted_remaining, 500.0);
        assert_eq!(projection.projected_total, projection.predicted_monthly);
    }

    #[test]
    fn march_scenario_matches_expected_figures() {
        let projection = project(80.0, date!(2024 - 03 - 15), DEFAULT_WARNING_THRESHOLD);

        assert_float_eq(projection.predicted_monthly, 80.0 / 15.0 * 31.0);
        assert!((projection.predicted_monthly - 165.33).abs() < 0.01);
        assert!((projection.month_progress - 48.39).abs() < 0.01);
    }

    #[test]
    fn last_day_of_month_predicts_current_spending() {
        for (spending, date) in [
            (0.0, date!(2024 - 04 - 30)),
            (123.45, date!(2024 - 04 - 30)),
            (9999.0, date!(2024 - 12 - 31)),
        ] {
            let projection = project(spending, date, DEFAULT_WARNING_THRESHOLD);

            assert_float_eq(projection.predicted_monthly, spending);
            assert_float_eq(projection.predicted_remaining, 0.0);
            assert_float_eq(projection.month_progress, 100.0);
        }
    }

    #[test]
    fn leap_year_february_has_twenty_nine_days() {
        let projection = project(29.0, date!(2024 - 02 - 01), DEFAULT_WARNING_THRESHOLD);

        assert_float_eq(projection.predicted_monthly, 29.0 * 29.0);

        let projection = project(28.0, date!(2023 - 02 - 01), DEFAULT_WARNING_THRESHOLD);

        assert_float_eq(projection.predicted_monthly, 28.0 * 28.0);
    }

    #[test]
    fn warning_trips_late_in_the_month() {
        // Spending to date is always day/days_in_month of the prediction, so
        // the default threshold trips once 80% of the month has elapsed.
        let projection = project(100.0, date!(2024 - 04 - 12), DEFAULT_WARNING_THRESHOLD);
        assert!(!projection.warning);

        let projection = project(100.0, date!(2024 - 04 - 24), DEFAULT_WARNING_THRESHOLD);
        assert!(projection.warning);
    }

    #[test]
    fn warning_respects_custom_threshold() {
        let projection = project(100.0, date!(2024 - 04 - 15), 0.5);

        assert!(projection.warning);
    }

    #[test]
    fn projection_is_deterministic() {
        let first = project(80.0, date!(2024 - 03 - 15), DEFAULT_WARNING_THRESHOLD);
        let second = project(80.0, date!(2024 - 03 - 15), DEFAULT_WARNING_THRESHOLD);

        assert_eq!(first, second);
    }
}
