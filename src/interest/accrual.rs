use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};
use crate::interest::{InterestCalculation, InterestCalculator};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const DAYS_PER_YEAR: i64 = 365;

/// daily "amount owing" samples collected since the last accrual
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwingHistory {
    samples: Vec<Money>,
}

impl OwingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// record today's balance net of the offset, never below zero
    pub fn record(&mut self, principal: Money, offset: Money) -> Money {
        let owing = (principal - offset).floor_zero();
        self.samples.push(owing);
        owing
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// arithmetic mean of the samples, zero when empty
    pub fn mean(&self) -> Money {
        if self.samples.is_empty() {
            return Money::ZERO;
        }
        let total: Money = self.samples.iter().sum();
        total / Decimal::from(self.samples.len())
    }

    /// hand back the mean and start a new period
    pub fn drain_mean(&mut self) -> Money {
        let mean = self.mean();
        self.samples.clear();
        mean
    }
}

/// actual elapsed time between two instants as a fraction of a 365-day year
pub fn year_fraction(start: NaiveDateTime, end: NaiveDateTime) -> Result<Decimal> {
    let seconds = (end - start).num_seconds();
    if seconds < 0 {
        return Err(SimulationError::InvalidDate {
            message: format!("accrual period ends ({end}) before it starts ({start})"),
        });
    }
    Ok(Decimal::from(seconds) / Decimal::from(SECONDS_PER_DAY * DAYS_PER_YEAR))
}

/// accrues interest on the mean daily balance of an accrual period (actual/365)
#[derive(Debug, Clone, Copy)]
pub struct MeanBalanceAccrual {
    pub annual_rate: Rate,
}

impl MeanBalanceAccrual {
    pub fn new(annual_rate: Rate) -> Self {
        Self { annual_rate }
    }

    /// consume the history and price the period `[start, end]`
    pub fn accrue(
        &self,
        history: &mut OwingHistory,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<InterestCalculation> {
        let samples = history.len();
        let mean = history.drain_mean();
        let mut calculation = self.calculate_interest(mean, self.annual_rate, start, end)?;
        calculation.samples = samples;
        Ok(calculation)
    }
}

impl InterestCalculator for MeanBalanceAccrual {
    fn calculate_interest(
        &self,
        balance: Money,
        rate: Rate,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<InterestCalculation> {
        let fraction = year_fraction(start, end)?;
        Ok(InterestCalculation {
            interest_amount: balance.interest_for(rate, fraction),
            balance_base: balance,
            year_fraction: fraction,
            samples: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_history_nets_offset_and_floors() {
        let mut history = OwingHistory::new();
        assert_eq!(history.record(Money::from_major(1_000), Money::from_major(200)), Money::from_major(800));
        assert_eq!(history.record(Money::from_major(100), Money::from_major(200)), Money::ZERO);
        assert_eq!(history.mean(), Money::from_major(400));
    }

    #[test]
    fn test_drain_resets_buffer() {
        let mut history = OwingHistory::new();
        history.record(Money::from_major(300), Money::ZERO);
        history.record(Money::from_major(100), Money::ZERO);

        assert_eq!(history.drain_mean(), Money::from_major(200));
        assert!(history.is_empty());
        assert_eq!(history.mean(), Money::ZERO);
    }

    #[test]
    fn test_year_fraction_uses_actual_days() {
        let jan = year_fraction(midnight(2023, 1, 31), midnight(2023, 2, 28)).unwrap();
        let mar = year_fraction(midnight(2023, 2, 28), midnight(2023, 3, 31)).unwrap();
        assert_eq!(jan.round_dp(20), (dec!(28) / dec!(365)).round_dp(20));
        assert_eq!(mar.round_dp(20), (dec!(31) / dec!(365)).round_dp(20));

        let partial = year_fraction(midnight(2023, 1, 1), midnight(2023, 1, 1) + Duration::hours(12)).unwrap();
        assert_eq!(partial.round_dp(20), (dec!(0.5) / dec!(365)).round_dp(20));

        assert!(year_fraction(midnight(2023, 2, 1), midnight(2023, 1, 1)).is_err());
    }

    #[test]
    fn test_mean_balance_accrual() {
        let engine = MeanBalanceAccrual::new(Rate::from_percent(dec!(7.3)));
        let mut history = OwingHistory::new();
        for _ in 0..10 {
            history.record(Money::from_major(10_000), Money::ZERO);
        }
        for _ in 0..10 {
            history.record(Money::from_major(5_000), Money::ZERO);
        }

        let start = midnight(2024, 3, 1);
        let calc = engine.accrue(&mut history, start, start + Duration::days(20)).unwrap();

        // 7500 mean * 20/365 * 7.3%
        assert_eq!(calc.balance_base, Money::from_major(7_500));
        assert_eq!(calc.samples, 20);
        assert_eq!(calc.interest_amount, Money::from_major(30));
        assert!(history.is_empty());
    }
}
