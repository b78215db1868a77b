use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Money;
use crate::errors::{Result, SimulationError};
use crate::state::DayEvents;

/// years, months and days between two calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CalendarSpan {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CalendarSpan {
    /// span from `start` to `end`, zero when `end` is not after `start`
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        if end <= start {
            return Self::default();
        }

        let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
        if end.day() < start.day() {
            months -= 1;
        }
        let months = months.max(0) as u32;

        // adding months clamps to the end of shorter months
        let anchor = start
            .checked_add_months(Months::new(months))
            .unwrap_or(start);
        let days = (end - anchor).num_days().max(0) as u32;

        Self {
            years: months / 12,
            months: months % 12,
            days,
        }
    }
}

impl fmt::Display for CalendarSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}y {}m {}d", self.years, self.months, self.days)
    }
}

/// elapsed years on a 365-day basis
pub fn years_between(start: NaiveDate, end: NaiveDate) -> Decimal {
    Decimal::from((end - start).num_days()) / Decimal::from(365)
}

/// one row per day on which something happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    pub loan_years: Decimal,
    pub loan_duration: CalendarSpan,
    pub schedule_years: Decimal,
    pub schedule_duration: CalendarSpan,
    pub interest: Option<Money>,
    pub redraw: Option<Money>,
    pub repayment: Option<Money>,
    pub extra_win_for_loan: Option<Money>,
    pub extra_win_surplus: Option<Money>,
    pub principal: Money,
}

impl ScheduleRow {
    /// day-zero row with every delta set to zero
    pub fn initial(
        loan_start: NaiveDate,
        schedule_start: NaiveDate,
        principal: Money,
        with_extra_win: bool,
    ) -> Self {
        let zero_win = with_extra_win.then_some(Money::ZERO);
        Self {
            date: schedule_start,
            loan_years: years_between(loan_start, schedule_start),
            loan_duration: CalendarSpan::between(loan_start, schedule_start),
            schedule_years: Decimal::ZERO,
            schedule_duration: CalendarSpan::default(),
            interest: Some(Money::ZERO),
            redraw: Some(Money::ZERO),
            repayment: Some(Money::ZERO),
            extra_win_for_loan: zero_win,
            extra_win_surplus: zero_win,
            principal,
        }
    }

    pub fn from_events(
        date: NaiveDate,
        loan_start: NaiveDate,
        schedule_start: NaiveDate,
        events: &DayEvents,
        principal: Money,
    ) -> Self {
        Self {
            date,
            loan_years: years_between(loan_start, date),
            loan_duration: CalendarSpan::between(loan_start, date),
            schedule_years: years_between(schedule_start, date),
            schedule_duration: CalendarSpan::between(schedule_start, date),
            interest: events.interest,
            redraw: events.redraw,
            repayment: events.repayment,
            extra_win_for_loan: events.extra_win.map(|split| split.for_loan),
            extra_win_surplus: events.extra_win.map(|split| split.surplus),
            principal,
        }
    }

    /// principal on the previous event day, derived from this row's deltas
    pub fn principal_before(&self) -> Money {
        self.principal - self.interest.unwrap_or(Money::ZERO) - self.redraw.unwrap_or(Money::ZERO)
            + self.repayment.unwrap_or(Money::ZERO)
            + self.extra_win_for_loan.unwrap_or(Money::ZERO)
    }
}

/// ordered simulation output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn new(rows: Vec<ScheduleRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&ScheduleRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&ScheduleRow> {
        self.rows.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    pub fn total_interest(&self) -> Money {
        self.rows.iter().filter_map(|row| row.interest).sum()
    }

    pub fn total_repayment(&self) -> Money {
        self.rows.iter().filter_map(|row| row.repayment).sum()
    }

    pub fn total_redraw(&self) -> Money {
        self.rows.iter().filter_map(|row| row.redraw).sum()
    }

    pub fn total_extra_win_for_loan(&self) -> Money {
        self.rows.iter().filter_map(|row| row.extra_win_for_loan).sum()
    }

    pub fn total_extra_win_surplus(&self) -> Money {
        self.rows.iter().filter_map(|row| row.extra_win_surplus).sum()
    }

    pub fn initial_principal(&self) -> Money {
        self.first().map_or(Money::ZERO, |row| row.principal)
    }

    pub fn final_principal(&self) -> Money {
        self.last().map_or(Money::ZERO, |row| row.principal)
    }

    pub fn final_date(&self) -> Option<NaiveDate> {
        self.last().map(|row| row.date)
    }

    /// years from loan start to the last row
    pub fn loan_years(&self) -> Decimal {
        self.last().map_or(Decimal::ZERO, |row| row.loan_years)
    }

    /// days from the first row to the last row
    pub fn duration_days(&self) -> i64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => (last.date - first.date).num_days(),
            _ => 0,
        }
    }

    /// principal of the last row on or before `date`, zero before the first row
    pub fn principal_on(&self, date: NaiveDate) -> Money {
        self.rows
            .iter()
            .take_while(|row| row.date <= date)
            .last()
            .map_or(Money::ZERO, |row| row.principal)
    }

    /// first row whose principal has dropped to `threshold` or below
    pub fn first_at_or_below(&self, threshold: Money) -> Option<&ScheduleRow> {
        self.rows.iter().find(|row| row.principal <= threshold)
    }

    /// rows dated on or before `date`
    pub fn rows_until(&self, date: NaiveDate) -> &[ScheduleRow] {
        let end = self.rows.partition_point(|row| row.date <= date);
        &self.rows[..end]
    }

    /// the redraw column entries that carry an amount
    pub fn redraws(&self) -> impl Iterator<Item = (NaiveDate, Money)> + '_ {
        self.rows
            .iter()
            .filter_map(|row| row.redraw.filter(|m| !m.is_zero()).map(|m| (row.date, m)))
    }

    /// check principal conservation row by row
    pub fn verify_balance(&self) -> Result<()> {
        for pair in self.rows.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            if after.principal_before() != before.principal {
                return Err(SimulationError::CalculationError {
                    message: format!(
                        "principal on {} does not follow from {}: expected {}, rows imply {}",
                        after.date,
                        before.date,
                        before.principal,
                        after.principal_before()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleRow;
    type IntoIter = std::slice::Iter<'a, ScheduleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
