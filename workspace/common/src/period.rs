use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reporting period for revenue aggregation. All ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "granularity", rename_all = "lowercase")]
pub enum ReportPeriod {
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
    Year { year: i32 },
}

impl ReportPeriod {
    /// Inclusive (first day, last day) covered by this period.
    ///
    /// Returns `None` for out-of-range inputs (month 0 or 13, quarter 0 or 5).
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            ReportPeriod::Month { year, month } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                Some((first, last_day_of_month(year, month)?))
            }
            ReportPeriod::Quarter { year, quarter } => {
                if !(1..=4).contains(&quarter) {
                    return None;
                }
                let first_month = (quarter - 1) * 3 + 1;
                let first = NaiveDate::from_ymd_opt(year, first_month, 1)?;
                Some((first, last_day_of_month(year, first_month + 2)?))
            }
            ReportPeriod::Year { year } => Some((
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year, 12, 31)?,
            )),
        }
    }

    /// The (year, month) pairs this period spans. Goals are stored per
    /// calendar month, so aggregation sums goal rows over these pairs.
    pub fn months(&self) -> Vec<(i32, u32)> {
        match *self {
            ReportPeriod::Month { year, month } => vec![(year, month)],
            ReportPeriod::Quarter { year, quarter } => {
                let first_month = (quarter - 1) * 3 + 1;
                (first_month..first_month + 3).map(|m| (year, m)).collect()
            }
            ReportPeriod::Year { year } => (1..=12).map(|m| (year, m)).collect(),
        }
    }

    /// Calendar days left in the period as seen from `today`.
    ///
    /// A fully elapsed period yields 0; a future period yields its full
    /// length; inside the period the count excludes today itself.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        let Some((first, last)) = self.date_range() else {
            return 0;
        };
        if today > last {
            0
        } else if today < first {
            (last - first).num_days() + 1
        } else {
            (last - today).num_days()
        }
    }
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt()
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            ReportPeriod::Month { year, month } => write!(f, "{year}-{month:02}"),
            ReportPeriod::Quarter { year, quarter } => write!(f, "{year}-Q{quarter}"),
            ReportPeriod::Year { year } => write!(f, "{year}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_range_handles_leap_february() {
        let period = ReportPeriod::Month {
            year: 2024,
            month: 2,
        };
        assert_eq!(
            period.date_range(),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
    }

    #[test]
    fn quarter_spans_three_months() {
        let period = ReportPeriod::Quarter {
            year: 2025,
            quarter: 4,
        };
        assert_eq!(
            period.date_range(),
            Some((date(2025, 10, 1), date(2025, 12, 31)))
        );
        assert_eq!(
            period.months(),
            vec![(2025, 10), (2025, 11), (2025, 12)]
        );
    }

    #[test]
    fn invalid_month_yields_no_range() {
        let period = ReportPeriod::Month {
            year: 2025,
            month: 13,
        };
        assert_eq!(period.date_range(), None);
    }

    #[test]
    fn days_remaining_past_current_future() {
        let period = ReportPeriod::Month {
            year: 2025,
            month: 3,
        };
        assert_eq!(period.days_remaining(date(2025, 4, 1)), 0);
        assert_eq!(period.days_remaining(date(2025, 3, 10)), 21);
        assert_eq!(period.days_remaining(date(2025, 3, 31)), 0);
        assert_eq!(period.days_remaining(date(2025, 2, 1)), 31);
    }

    #[test]
    fn period_serializes_with_granularity_tag() {
        let json = serde_json::to_value(ReportPeriod::Quarter {
            year: 2025,
            quarter: 2,
        })
        .unwrap();
        assert_eq!(json["granularity"], "quarter");
        assert_eq!(json["quarter"], 2);
    }
}
