use chrono::{Duration, NaiveDate};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cycle::Cycle;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};

/// parameters of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// anchor for "years since the loan started" reporting
    pub loan_start: NaiveDate,
    pub principal: Money,
    /// offset balance, constant for the whole run
    #[serde(default)]
    pub offset: Money,
    /// day zero of the simulation
    pub schedule_start: NaiveDate,
    /// annual rate, written as a plain percentage in json (5.5 for 5.5%)
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    pub prev_interest_date: NaiveDate,
    pub interest_cycle: Cycle,
    pub repayment: Money,
    pub prev_repayment_date: NaiveDate,
    pub repayment_cycle: Cycle,
    /// tracked by callers that keep a stash account next to the loan, the projection ignores it
    #[serde(default)]
    pub repayment_use_stash: bool,
    /// hard stop, treated as maturity day
    #[serde(default)]
    pub schedule_end: Option<NaiveDate>,
    #[serde(default)]
    pub leftover: Option<LeftoverInjection>,
    #[serde(default)]
    pub extra_win: Option<ExtraWin>,
}

/// one-shot capital moved into the loan, e.g. another tranche's payoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftoverInjection {
    pub incoming: NaiveDate,
    /// added to principal once
    #[serde(default)]
    pub amount: Option<Money>,
    /// added to every repayment from `incoming` onwards
    #[serde(default)]
    pub repayment: Option<Money>,
}

/// recurring windfall applied against the loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraWin {
    pub amount: Money,
    pub cycle: Cycle,
    /// window counted from `schedule_start`, unbounded when absent
    #[serde(default)]
    pub duration_days: Option<u32>,
}

impl SimulationConfig {
    /// month-end interest and fortnightly repayments, everything starting on `start`
    pub fn bank_default(
        principal: Money,
        interest_rate: Rate,
        repayment: Money,
        start: NaiveDate,
    ) -> Self {
        Self::with_cycles(
            principal,
            interest_rate,
            repayment,
            start,
            Cycle::MonthlyEndOfMonth,
            Cycle::Fortnightly,
        )
    }

    /// both interest and repayment on the same cycle, phase-aligned at `start`
    pub fn uniform(
        principal: Money,
        interest_rate: Rate,
        repayment: Money,
        start: NaiveDate,
        cycle: Cycle,
    ) -> Self {
        Self::with_cycles(principal, interest_rate, repayment, start, cycle, cycle)
    }

    fn with_cycles(
        principal: Money,
        interest_rate: Rate,
        repayment: Money,
        start: NaiveDate,
        interest_cycle: Cycle,
        repayment_cycle: Cycle,
    ) -> Self {
        Self {
            loan_start: start,
            principal,
            offset: Money::ZERO,
            schedule_start: start,
            interest_rate,
            prev_interest_date: start,
            interest_cycle,
            repayment,
            prev_repayment_date: start,
            repayment_cycle,
            repayment_use_stash: false,
            schedule_end: None,
            leftover: None,
            extra_win: None,
        }
    }

    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    pub fn with_offset(mut self, offset: Money) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_interest_rate(mut self, rate: Rate) -> Self {
        self.interest_rate = rate;
        self
    }

    pub fn with_repayment(mut self, repayment: Money) -> Self {
        self.repayment = repayment;
        self
    }

    pub fn with_schedule_end(mut self, end: NaiveDate) -> Self {
        self.schedule_end = Some(end);
        self
    }

    pub fn with_leftover(mut self, leftover: LeftoverInjection) -> Self {
        self.leftover = Some(leftover);
        self
    }

    pub fn with_extra_win(mut self, extra_win: ExtraWin) -> Self {
        self.extra_win = Some(extra_win);
        self
    }

    /// last day windfalls may land on, `None` when unbounded or not configured
    pub fn extra_win_horizon(&self) -> Option<NaiveDate> {
        let days = self.extra_win.as_ref()?.duration_days?;
        Some(self.schedule_start + Duration::days(i64::from(days)))
    }

    /// reject inputs the simulator cannot give a meaningful answer for
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("principal", self.principal),
            ("offset", self.offset),
            ("repayment", self.repayment),
        ] {
            if value.is_negative() {
                return Err(SimulationError::InvalidConfiguration {
                    message: format!("{name} must not be negative, got {value}"),
                });
            }
        }

        if self.interest_rate.is_negative() {
            return Err(SimulationError::InvalidConfiguration {
                message: format!("interest rate must not be negative, got {}", self.interest_rate),
            });
        }

        if self.prev_interest_date > self.schedule_start || self.prev_repayment_date > self.schedule_start {
            return Err(SimulationError::InvalidDate {
                message: format!(
                    "previous interest ({}) and repayment ({}) dates must not be after schedule start {}",
                    self.prev_interest_date, self.prev_repayment_date, self.schedule_start
                ),
            });
        }

        if let Some(end) = self.schedule_end {
            if end < self.schedule_start {
                return Err(SimulationError::InvalidDate {
                    message: format!("schedule end {end} is before schedule start {}", self.schedule_start),
                });
            }
        }

        if let Some(leftover) = &self.leftover {
            let negative = [leftover.amount, leftover.repayment]
                .into_iter()
                .flatten()
                .any(|m| m.is_negative());
            if negative {
                return Err(SimulationError::InvalidConfiguration {
                    message: "leftover amount and repayment must not be negative".to_string(),
                });
            }
        }

        if let Some(extra_win) = &self.extra_win {
            if extra_win.amount.is_negative() {
                return Err(SimulationError::InvalidConfiguration {
                    message: format!("extra win must not be negative, got {}", extra_win.amount),
                });
            }
            if extra_win.duration_days == Some(0) {
                return Err(SimulationError::InvalidConfiguration {
                    message: "extra win duration must be at least one day".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// builder that fills unset dates from a time provider
#[derive(Debug, Default)]
pub struct SimulationBuilder {
    loan_start: Option<NaiveDate>,
    principal: Option<Money>,
    offset: Option<Money>,
    schedule_start: Option<NaiveDate>,
    interest_rate: Option<Rate>,
    prev_interest_date: Option<NaiveDate>,
    interest_cycle: Option<Cycle>,
    repayment: Option<Money>,
    prev_repayment_date: Option<NaiveDate>,
    repayment_cycle: Option<Cycle>,
    schedule_end: Option<NaiveDate>,
    leftover: Option<LeftoverInjection>,
    extra_win: Option<ExtraWin>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_start(mut self, date: NaiveDate) -> Self {
        self.loan_start = Some(date);
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn offset(mut self, offset: Money) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn schedule_start(mut self, date: NaiveDate) -> Self {
        self.schedule_start = Some(date);
        self
    }

    /// annual rate as a plain percentage
    pub fn interest_percent(mut self, percent: Decimal) -> Self {
        self.interest_rate = Some(Rate::from_percent(percent));
        self
    }

    pub fn interest_rate(mut self, rate: Rate) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn interest(mut self, prev_date: NaiveDate, cycle: Cycle) -> Self {
        self.prev_interest_date = Some(prev_date);
        self.interest_cycle = Some(cycle);
        self
    }

    pub fn interest_cycle(mut self, cycle: Cycle) -> Self {
        self.interest_cycle = Some(cycle);
        self
    }

    pub fn repayment(mut self, amount: Money) -> Self {
        self.repayment = Some(amount);
        self
    }

    pub fn repayment_schedule(mut self, prev_date: NaiveDate, cycle: Cycle) -> Self {
        self.prev_repayment_date = Some(prev_date);
        self.repayment_cycle = Some(cycle);
        self
    }

    pub fn repayment_cycle(mut self, cycle: Cycle) -> Self {
        self.repayment_cycle = Some(cycle);
        self
    }

    pub fn schedule_end(mut self, date: NaiveDate) -> Self {
        self.schedule_end = Some(date);
        self
    }

    pub fn leftover(mut self, incoming: NaiveDate, amount: Option<Money>, repayment: Option<Money>) -> Self {
        self.leftover = Some(LeftoverInjection {
            incoming,
            amount,
            repayment,
        });
        self
    }

    pub fn extra_win(mut self, amount: Money, cycle: Cycle, duration_days: Option<u32>) -> Self {
        self.extra_win = Some(ExtraWin {
            amount,
            cycle,
            duration_days,
        });
        self
    }

    /// build using the system clock for unset dates
    pub fn build(self) -> Result<SimulationConfig> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build_with_time(&time)
    }

    /// build using `time_provider` for unset dates
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<SimulationConfig> {
        let principal = self.principal.ok_or(SimulationError::InvalidConfiguration {
            message: "principal required".to_string(),
        })?;

        let interest_rate = self.interest_rate.ok_or(SimulationError::InvalidConfiguration {
            message: "interest rate required".to_string(),
        })?;

        let repayment = self.repayment.ok_or(SimulationError::InvalidConfiguration {
            message: "repayment required".to_string(),
        })?;

        let schedule_start = self
            .schedule_start
            .unwrap_or_else(|| time_provider.now().date_naive());

        let config = SimulationConfig {
            loan_start: self.loan_start.unwrap_or(schedule_start),
            principal,
            offset: self.offset.unwrap_or(Money::ZERO),
            schedule_start,
            interest_rate,
            prev_interest_date: self.prev_interest_date.unwrap_or(schedule_start),
            interest_cycle: self.interest_cycle.unwrap_or(Cycle::MonthlyEndOfMonth),
            repayment,
            prev_repayment_date: self.prev_repayment_date.unwrap_or(schedule_start),
            repayment_cycle: self.repayment_cycle.unwrap_or(Cycle::Fortnightly),
            repayment_use_stash: false,
            schedule_end: self.schedule_end,
            leftover: self.leftover,
            extra_win: self.extra_win,
        };
        config.validate()?;
        Ok(config)
    }
}

/// (de)serialize a `Rate` as a plain percentage number
mod percent {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::decimal::Rate;

    pub fn serialize<S: Serializer>(rate: &Rate, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&rate.as_percentage().normalize(), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rate, D::Error> {
        let percent = <Decimal as Deserialize>::deserialize(deserializer)?;
        Ok(Rate::from_percent(percent))
    }
}
