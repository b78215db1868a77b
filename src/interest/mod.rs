pub mod accrual;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::Result;

pub use accrual::{year_fraction, MeanBalanceAccrual, OwingHistory};

/// interest calculation result
#[derive(Debug, Clone, PartialEq)]
pub struct InterestCalculation {
    pub interest_amount: Money,
    /// balance the rate was applied to
    pub balance_base: Money,
    pub year_fraction: Decimal,
    /// number of daily samples behind `balance_base`
    pub samples: usize,
}

/// trait for interest calculations
pub trait InterestCalculator {
    fn calculate_interest(
        &self,
        balance: Money,
        rate: Rate,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<InterestCalculation>;
}
