//! Dividend history summary and forward projection
//!
//! Pure math, no I/O. The projection assumes a quarterly-equal split of the
//! trailing annual yield; it is a heuristic, not a payment calendar.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Assumed payment cadence for Brazilian equities and FIIs.
pub const PAYMENTS_PER_YEAR: u32 = 4;

/// A single dividend payment, as reported by the upstream feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub date: DateTime<Utc>,
    pub amount: f64,
}

/// A ticker's payment history as returned by the upstream feed, newest
/// payment first.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendHistory {
    pub ticker: String,
    pub current_price: f64,
    pub dividends: Vec<Dividend>,
}

/// Trailing figures derived from a payment history and the current price.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendSummary {
    pub last_twelve_months: f64,
    pub trailing_yield_percent: f64,
    pub total_historical: f64,
    pub monthly_average: f64,
}

/// One estimated future payment.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendProjection {
    pub ticker: String,
    pub estimated_date: DateTime<Utc>,
    pub per_unit_amount: f64,
    pub units_held: f64,
    pub total_estimated: f64,
}

pub fn summarize(dividends: &[Dividend], current_price: f64) -> DividendSummary {
    summarize_at(dividends, current_price, Utc::now())
}

pub fn summarize_at(
    dividends: &[Dividend],
    current_price: f64,
    now: DateTime<Utc>,
) -> DividendSummary {
    let twelve_months_ago = now
        .checked_sub_months(Months::new(12))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let last_twelve_months: f64 = dividends
        .iter()
        .filter(|d| d.date >= twelve_months_ago)
        .map(|d| d.amount)
        .sum();

    let trailing_yield_percent = if current_price > 0.0 {
        (last_twelve_months / current_price) * 100.0
    } else {
        0.0
    };

    let total_historical: f64 = dividends.iter().map(|d| d.amount).sum();
    let monthly_average = if dividends.is_empty() {
        0.0
    } else {
        total_historical / 12.0_f64.min(dividends.len() as f64)
    };

    DividendSummary {
        last_twelve_months,
        trailing_yield_percent,
        total_historical,
        monthly_average,
    }
}

/// Estimates the next `quarters_ahead` payments from a trailing yield.
///
/// `annual_per_unit = price * yield / 100`, split into equal quarterly
/// payments dated 3 months apart starting 3 months from now. Returns an
/// empty sequence when the yield or the position is not positive.
pub fn project(
    ticker: &str,
    trailing_yield_percent: f64,
    current_price: f64,
    units_held: f64,
    quarters_ahead: u32,
) -> Vec<DividendProjection> {
    project_from(
        Utc::now(),
        ticker,
        trailing_yield_percent,
        current_price,
        units_held,
        quarters_ahead,
    )
}

pub fn project_from(
    now: DateTime<Utc>,
    ticker: &str,
    trailing_yield_percent: f64,
    current_price: f64,
    units_held: f64,
    quarters_ahead: u32,
) -> Vec<DividendProjection> {
    if trailing_yield_percent <= 0.0 || units_held <= 0.0 {
        return Vec::new();
    }

    let annual_per_unit = current_price * trailing_yield_percent / 100.0;
    let per_payment = annual_per_unit / PAYMENTS_PER_YEAR as f64;

    (1..=quarters_ahead)
        .filter_map(|quarter| {
            let estimated_date = now.checked_add_months(Months::new(3 * quarter))?;
            Some(DividendProjection {
                ticker: ticker.to_string(),
                estimated_date,
                per_unit_amount: per_payment,
                units_held,
                total_estimated: per_payment * units_held,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_projection_quarterly_split() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let projections = project_from(now, "VALE3", 6.0, 50.0, 100.0, 4);

        assert_eq!(projections.len(), 4);
        for (i, p) in projections.iter().enumerate() {
            assert!((p.per_unit_amount - 0.75).abs() < 1e-9);
            assert!((p.total_estimated - 75.0).abs() < 1e-9);
            let expected = now + Months::new(3 * (i as u32 + 1));
            assert_eq!(p.estimated_date, expected);
        }
    }

    #[test]
    fn test_projection_requires_positive_yield_and_units() {
        assert!(project("VALE3", 0.0, 50.0, 100.0, 4).is_empty());
        assert!(project("VALE3", -1.0, 50.0, 100.0, 4).is_empty());
        assert!(project("VALE3", 6.0, 50.0, 0.0, 4).is_empty());
    }

    #[test]
    fn test_projection_entry_count_follows_quarters() {
        let projections = project("ITSA4", 8.0, 10.0, 50.0, 2);
        assert_eq!(projections.len(), 2);
    }

    #[test]
    fn test_summary_trailing_window() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let dividends = vec![
            Dividend {
                date: Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
                amount: 1.5,
            },
            Dividend {
                date: Utc.with_ymd_and_hms(2025, 9, 20, 0, 0, 0).unwrap(),
                amount: 0.5,
            },
            // Outside the trailing window
            Dividend {
                date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
                amount: 2.0,
            },
        ];

        let summary = summarize_at(&dividends, 40.0, now);
        assert!((summary.last_twelve_months - 2.0).abs() < 1e-9);
        assert!((summary.trailing_yield_percent - 5.0).abs() < 1e-9);
        assert!((summary.total_historical - 4.0).abs() < 1e-9);
        assert!((summary.monthly_average - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_zero_price_yields_nothing() {
        let dividends = vec![Dividend {
            date: Utc::now(),
            amount: 1.0,
        }];
        let summary = summarize(&dividends, 0.0);
        assert_eq!(summary.trailing_yield_percent, 0.0);
    }

    #[test]
    fn test_summary_empty_history() {
        let summary = summarize(&[], 40.0);
        assert_eq!(summary.last_twelve_months, 0.0);
        assert_eq!(summary.monthly_average, 0.0);
    }
}
