use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, SimulationError};

/// seconds in 365/12 days
const AVERAGE_MONTH_SECONDS: i64 = 365 * 24 * 60 * 60 / 12;

/// recurrence rule for interest accrual, repayment and windfall boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cycle {
    /// every 14 days
    Fortnightly,
    /// every 365/12 days, drifting against calendar months
    MonthlyAverage,
    /// the 1st of the following month
    #[serde(rename = "MONTHLY_1ST_OF_MONTH")]
    Monthly1stOfMonth,
    /// the last day of the month, see [`Cycle::next_after`]
    MonthlyEndOfMonth,
    /// every 365 days, leap days ignored
    Yearly,
}

impl Cycle {
    pub const ALL: [Cycle; 5] = [
        Cycle::Fortnightly,
        Cycle::MonthlyAverage,
        Cycle::Monthly1stOfMonth,
        Cycle::MonthlyEndOfMonth,
        Cycle::Yearly,
    ];

    /// next boundary after `date`
    ///
    /// `MonthlyEndOfMonth` snaps a mid-month date forward to the end of its own
    /// month and only moves a whole month when `date` already sits on a month end.
    /// Time of day is carried through unchanged.
    pub fn next_after(&self, date: NaiveDateTime) -> Result<NaiveDateTime> {
        let next = match self {
            Cycle::Fortnightly => date + Duration::days(14),
            Cycle::MonthlyAverage => date + Duration::seconds(AVERAGE_MONTH_SECONDS),
            Cycle::Monthly1stOfMonth => {
                let (year, month) = following_month(date.year(), date.month());
                first_of_month(year, month)?.and_time(date.time())
            }
            Cycle::MonthlyEndOfMonth => {
                let day = date.date();
                let target = if is_month_end(day) {
                    let (year, month) = following_month(day.year(), day.month());
                    last_of_month(year, month)?
                } else {
                    last_of_month(day.year(), day.month())?
                };
                target.and_time(date.time())
            }
            Cycle::Yearly => date + Duration::days(365),
        };
        Ok(next)
    }

    /// nominal number of periods per year, for planner comparisons
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            Cycle::Fortnightly => Decimal::from(365) / Decimal::from(14),
            Cycle::MonthlyAverage | Cycle::Monthly1stOfMonth | Cycle::MonthlyEndOfMonth => {
                Decimal::from(12)
            }
            Cycle::Yearly => Decimal::ONE,
        }
    }

    pub fn is_fortnightly(&self) -> bool {
        matches!(self, Cycle::Fortnightly)
    }

    pub fn is_monthly(&self) -> bool {
        matches!(
            self,
            Cycle::MonthlyAverage | Cycle::Monthly1stOfMonth | Cycle::MonthlyEndOfMonth
        )
    }

    pub fn is_yearly(&self) -> bool {
        matches!(self, Cycle::Yearly)
    }

    /// wire name, matches the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Cycle::Fortnightly => "FORTNIGHTLY",
            Cycle::MonthlyAverage => "MONTHLY_AVERAGE",
            Cycle::Monthly1stOfMonth => "MONTHLY_1ST_OF_MONTH",
            Cycle::MonthlyEndOfMonth => "MONTHLY_END_OF_MONTH",
            Cycle::Yearly => "YEARLY",
        }
    }

    /// short label used in statement descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Cycle::Fortnightly => "fortnightly",
            Cycle::MonthlyAverage | Cycle::Monthly1stOfMonth | Cycle::MonthlyEndOfMonth => {
                "monthly"
            }
            Cycle::Yearly => "yearly",
        }
    }
}

/// free-function form of [`Cycle::next_after`]
pub fn increment(date: NaiveDateTime, cycle: Cycle) -> Result<NaiveDateTime> {
    cycle.next_after(date)
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cycle {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        Cycle::ALL
            .into_iter()
            .find(|cycle| cycle.as_str() == normalized)
            .ok_or_else(|| SimulationError::UnknownCycle {
                value: s.to_string(),
            })
    }
}

pub fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

pub fn last_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = following_month(year, month);
    first_of_month(next_year, next_month)?
        .pred_opt()
        .ok_or_else(|| SimulationError::InvalidDate {
            message: format!("no month end for {year}-{month:02}"),
        })
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| SimulationError::InvalidDate {
        message: format!("{year}-{month:02} is out of range"),
    })
}

fn following_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at_midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_fortnightly_and_yearly() {
        let start = at_midnight(2024, 2, 20);
        assert_eq!(increment(start, Cycle::Fortnightly).unwrap(), at_midnight(2024, 3, 5));
        // leap day is not compensated
        assert_eq!(increment(start, Cycle::Yearly).unwrap(), at_midnight(2025, 2, 19));
    }

    #[test]
    fn test_monthly_average_carries_fractional_day() {
        let start = at_midnight(2024, 1, 1);
        let next = increment(start, Cycle::MonthlyAverage).unwrap();
        assert_eq!(next, at_midnight(2024, 1, 31) + Duration::hours(10));

        let mut date = start;
        for _ in 0..12 {
            date = increment(date, Cycle::MonthlyAverage).unwrap();
        }
        assert_eq!(date, start + Duration::days(365));
    }

    #[test]
    fn test_first_of_month_ignores_day() {
        assert_eq!(
            increment(at_midnight(2024, 1, 1), Cycle::Monthly1stOfMonth).unwrap(),
            at_midnight(2024, 2, 1)
        );
        assert_eq!(
            increment(at_midnight(2024, 12, 31), Cycle::Monthly1stOfMonth).unwrap(),
            at_midnight(2025, 1, 1)
        );
    }

    #[test]
    fn test_end_of_month_snaps_then_advances() {
        // mid-month snaps to its own month end
        assert_eq!(
            increment(at_midnight(2024, 1, 15), Cycle::MonthlyEndOfMonth).unwrap(),
            at_midnight(2024, 1, 31)
        );
        // already on a month end moves a whole month
        assert_eq!(
            increment(at_midnight(2024, 1, 31), Cycle::MonthlyEndOfMonth).unwrap(),
            at_midnight(2024, 2, 29)
        );
        assert_eq!(
            increment(at_midnight(2023, 2, 28), Cycle::MonthlyEndOfMonth).unwrap(),
            at_midnight(2023, 3, 31)
        );
        assert_eq!(
            increment(at_midnight(2024, 12, 31), Cycle::MonthlyEndOfMonth).unwrap(),
            at_midnight(2025, 1, 31)
        );
    }

    #[test]
    fn test_parse_and_display() {
        for cycle in Cycle::ALL {
            assert_eq!(cycle.to_string().parse::<Cycle>().unwrap(), cycle);
        }
        assert_eq!("monthly_end_of_month".parse::<Cycle>().unwrap(), Cycle::MonthlyEndOfMonth);

        let err = "QUARTERLY".parse::<Cycle>().unwrap_err();
        assert!(matches!(err, SimulationError::UnknownCycle { .. }));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Cycle::Monthly1stOfMonth).unwrap();
        assert_eq!(json, "\"MONTHLY_1ST_OF_MONTH\"");
        let back: Cycle = serde_json::from_str("\"FORTNIGHTLY\"").unwrap();
        assert_eq!(back, Cycle::Fortnightly);
    }

    #[test]
    fn test_predicates() {
        assert!(Cycle::Fortnightly.is_fortnightly());
        assert!(Cycle::MonthlyEndOfMonth.is_monthly());
        assert!(!Cycle::Yearly.is_monthly());
        assert!(Cycle::Yearly.is_yearly());
    }
}
