use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::interest::{MeanBalanceAccrual, OwingHistory};
use crate::payments::{clamp_to_principal, WindfallSplit};

/// loan state carried from one simulated day to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    pub curr_date: NaiveDate,
    pub principal: Money,
    pub offset: Money,
    /// net-of-offset balance per day since the last accrual
    pub owing_history: OwingHistory,

    // cycle phase, each advanced by exactly one increment per crossing
    pub prev_interest_date: NaiveDateTime,
    pub prev_repayment_date: NaiveDateTime,
    pub prev_extra_win_date: NaiveDateTime,

    pub leftover_incoming: Option<NaiveDate>,
    /// taken on first use, never injected twice
    pub leftover_amount: Option<Money>,
    pub leftover_repayment: Option<Money>,
}

/// everything that happened on one simulated day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayEvents {
    pub interest: Option<Money>,
    pub redraw: Option<Money>,
    pub repayment: Option<Money>,
    pub extra_win: Option<WindfallSplit>,
    /// the schedule end was reached today
    pub matured: bool,
}

impl DayEvents {
    pub fn is_empty(&self) -> bool {
        self.interest.is_none()
            && self.redraw.is_none()
            && self.repayment.is_none()
            && self.extra_win.is_none()
    }

    /// whether the day earns a row in the schedule
    pub fn is_reportable(&self) -> bool {
        self.matured || !self.is_empty()
    }
}

impl LoanState {
    /// day-zero state for `config`
    pub fn new(config: &SimulationConfig) -> Self {
        let leftover = config.leftover.as_ref();
        Self {
            curr_date: config.schedule_start,
            principal: config.principal,
            offset: config.offset,
            owing_history: OwingHistory::new(),
            prev_interest_date: midnight(config.prev_interest_date),
            prev_repayment_date: midnight(config.prev_repayment_date),
            prev_extra_win_date: midnight(config.schedule_start),
            leftover_incoming: leftover.map(|l| l.incoming),
            leftover_amount: leftover.and_then(|l| l.amount),
            leftover_repayment: leftover.and_then(|l| l.repayment),
        }
    }

    /// the leftover trigger date has been reached
    pub fn leftover_arrived(&self) -> bool {
        self.leftover_incoming
            .map_or(false, |incoming| self.curr_date >= incoming)
    }

    /// a leftover amount is still waiting to be injected
    pub fn leftover_pending(&self) -> bool {
        self.leftover_incoming.is_some() && self.leftover_amount.is_some()
    }

    /// base repayment plus any absorbed tranche repayment
    pub fn effective_repayment(&self, base: Money) -> Money {
        match self.leftover_repayment {
            Some(extra) if self.leftover_arrived() => base + extra,
            _ => base,
        }
    }

    /// nothing owing and nothing left to wait for
    pub fn is_settled(&self, config: &SimulationConfig) -> bool {
        let windfalls_done = config
            .extra_win_horizon()
            .map_or(true, |horizon| self.curr_date >= horizon);
        !self.principal.is_positive() && !self.leftover_pending() && windfalls_done
    }

    /// advance one day and apply the events due on it
    pub fn step(&mut self, config: &SimulationConfig) -> Result<DayEvents> {
        self.curr_date += Duration::days(1);
        let now = midnight(self.curr_date);
        let matured = config.schedule_end.map_or(false, |end| self.curr_date >= end);

        let mut events = DayEvents {
            matured,
            ..DayEvents::default()
        };

        self.owing_history.record(self.principal, self.offset);

        // interest
        let accrual = MeanBalanceAccrual::new(config.interest_rate);
        let next_interest = config.interest_cycle.next_after(self.prev_interest_date)?;
        let period_end = if now >= next_interest {
            Some(next_interest)
        } else if matured && !self.owing_history.is_empty() {
            Some(now)
        } else {
            None
        };
        if let Some(period_end) = period_end {
            let calculation = accrual.accrue(&mut self.owing_history, self.prev_interest_date, period_end)?;
            self.principal += calculation.interest_amount;
            self.prev_interest_date = period_end;
            events.interest = non_zero(calculation.interest_amount);
            debug!(
                target: "loan.sim",
                date = %self.curr_date,
                interest = %calculation.interest_amount,
                mean_owing = %calculation.balance_base,
                samples = calculation.samples,
                "interest accrued"
            );
        }

        // leftover
        if self.leftover_arrived() {
            if let Some(amount) = self.leftover_amount.take() {
                self.principal += amount;
                events.redraw = non_zero(amount);
                debug!(target: "loan.sim", date = %self.curr_date, amount = %amount, "leftover injected");
            }
        }

        // repayment
        let next_repayment = config.repayment_cycle.next_after(self.prev_repayment_date)?;
        if now >= next_repayment {
            let amount = clamp_to_principal(self.effective_repayment(config.repayment), self.principal);
            self.principal -= amount;
            self.prev_repayment_date = next_repayment;
            events.repayment = non_zero(amount);
            if !amount.is_zero() {
                debug!(
                    target: "loan.sim",
                    date = %self.curr_date,
                    repayment = %amount,
                    principal = %self.principal,
                    "repayment applied"
                );
            }
        }

        // windfall
        if let Some(extra_win) = &config.extra_win {
            let next_win = extra_win.cycle.next_after(self.prev_extra_win_date)?;
            if now >= next_win {
                let in_window = config
                    .extra_win_horizon()
                    .map_or(true, |horizon| next_win <= midnight(horizon));
                if in_window {
                    let split = WindfallSplit::split(extra_win.amount, self.principal);
                    self.principal -= split.for_loan;
                    if !split.total().is_zero() {
                        events.extra_win = Some(split);
                        debug!(
                            target: "loan.sim",
                            date = %self.curr_date,
                            for_loan = %split.for_loan,
                            surplus = %split.surplus,
                            "extra win applied"
                        );
                    }
                }
                self.prev_extra_win_date = next_win;
            }
        }

        Ok(events)
    }
}

pub(crate) fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn non_zero(amount: Money) -> Option<Money> {
    (!amount.is_zero()).then_some(amount)
}
