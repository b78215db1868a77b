use chrono::NaiveDate;
use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum SimulationError {
    /// repayment never outpaces the interest being charged
    #[error("loan did not finish within {years} years: {principal} still owing on {date}")]
    DidNotFinish {
        years: u32,
        date: NaiveDate,
        principal: Money,
    },

    #[error("unknown cycle: {value}")]
    UnknownCycle {
        value: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
