use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{LeftoverInjection, SimulationConfig};
use crate::cycle::Cycle;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};
use crate::schedule::Schedule;
use crate::simulator::simulate;
use crate::statement::{Statement, StatementSource, FIXED_ACCOUNT, VARIABLE_ACCOUNT};

/// unique identifier for a tranche
pub type TrancheId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrancheKind {
    Fixed,
    Variable,
}

impl TrancheKind {
    pub fn account_name(&self) -> &'static str {
        match self {
            TrancheKind::Fixed => FIXED_ACCOUNT,
            TrancheKind::Variable => VARIABLE_ACCOUNT,
        }
    }
}

/// an independently amortizing part of the loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    pub id: TrancheId,
    pub kind: TrancheKind,
    pub principal: Money,
    pub interest_rate: Rate,
    pub repayment: Money,
    pub interest_cycle: Cycle,
    pub repayment_cycle: Cycle,
    /// phase of the cycles, defaults to the schedule start
    pub prev_interest_date: Option<NaiveDate>,
    pub prev_repayment_date: Option<NaiveDate>,
}

impl Tranche {
    /// tranche on month-end interest and fortnightly repayments
    pub fn new(kind: TrancheKind, principal: Money, interest_rate: Rate, repayment: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            principal,
            interest_rate,
            repayment,
            interest_cycle: Cycle::MonthlyEndOfMonth,
            repayment_cycle: Cycle::Fortnightly,
            prev_interest_date: None,
            prev_repayment_date: None,
        }
    }

    pub fn with_cycles(mut self, interest_cycle: Cycle, repayment_cycle: Cycle) -> Self {
        self.interest_cycle = interest_cycle;
        self.repayment_cycle = repayment_cycle;
        self
    }

    pub fn with_phase(mut self, prev_interest_date: NaiveDate, prev_repayment_date: NaiveDate) -> Self {
        self.prev_interest_date = Some(prev_interest_date);
        self.prev_repayment_date = Some(prev_repayment_date);
        self
    }

    fn statement_source(&self) -> StatementSource {
        StatementSource {
            account: self.kind.account_name().to_string(),
            interest_cycle: self.interest_cycle,
            repayment_cycle: self.repayment_cycle,
            extra_repayment: Money::ZERO,
        }
    }

    fn simulation_config(&self, loan_start: NaiveDate, schedule_start: NaiveDate, offset: Money) -> SimulationConfig {
        SimulationConfig {
            loan_start,
            principal: self.principal,
            offset,
            schedule_start,
            interest_rate: self.interest_rate,
            prev_interest_date: self.prev_interest_date.unwrap_or(schedule_start),
            interest_cycle: self.interest_cycle,
            repayment: self.repayment,
            prev_repayment_date: self.prev_repayment_date.unwrap_or(schedule_start),
            repayment_cycle: self.repayment_cycle,
            repayment_use_stash: false,
            schedule_end: None,
            leftover: None,
            extra_win: None,
        }
    }
}

/// what the fixed tranche passes on when its term ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    pub date: NaiveDate,
    /// fixed principal still owing, moved into the variable tranche
    pub amount: Money,
    /// fixed repayment absorbed by the variable tranche
    pub repayment: Money,
}

/// a fixed and a variable tranche sharing one offset account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPortfolio {
    pub loan_start: NaiveDate,
    pub schedule_start: NaiveDate,
    pub fixed: Tranche,
    pub variable: Tranche,
    /// nets against the variable tranche only
    pub offset: Money,
    pub fixed_term_end: NaiveDate,
    pub schedule_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioProjection {
    pub fixed_id: TrancheId,
    pub variable_id: TrancheId,
    pub fixed: Schedule,
    pub variable: Schedule,
    pub handoff: Handoff,
}

impl LoanPortfolio {
    pub fn validate(&self) -> Result<()> {
        if self.fixed.kind != TrancheKind::Fixed || self.variable.kind != TrancheKind::Variable {
            return Err(SimulationError::InvalidConfiguration {
                message: "portfolio needs one fixed and one variable tranche".to_string(),
            });
        }
        if self.fixed_term_end < self.schedule_start {
            return Err(SimulationError::InvalidDate {
                message: format!(
                    "fixed term ends {} before the schedule starts {}",
                    self.fixed_term_end, self.schedule_start
                ),
            });
        }
        Ok(())
    }

    /// project the fixed tranche to its term end, then the variable tranche with the hand-off
    pub fn project(&self) -> Result<PortfolioProjection> {
        self.validate()?;

        let fixed_end = match self.schedule_end {
            Some(end) => end.min(self.fixed_term_end),
            None => self.fixed_term_end,
        };
        let fixed_config = self
            .fixed
            .simulation_config(self.loan_start, self.schedule_start, Money::ZERO)
            .with_schedule_end(fixed_end);
        let fixed = simulate(&fixed_config)?;

        let handoff = Handoff {
            date: fixed.final_date().unwrap_or(fixed_end),
            amount: fixed.final_principal(),
            repayment: self.fixed.repayment,
        };

        let mut variable_config = self
            .variable
            .simulation_config(self.loan_start, self.schedule_start, self.offset)
            .with_leftover(LeftoverInjection {
                incoming: handoff.date,
                amount: handoff.amount.is_positive().then_some(handoff.amount),
                repayment: Some(handoff.repayment),
            });
        variable_config.schedule_end = self.schedule_end;
        let variable = simulate(&variable_config)?;

        info!(
            target: "loan.tranche",
            handoff_date = %handoff.date,
            handoff_amount = %handoff.amount,
            variable_end = ?variable.final_date(),
            "portfolio projected"
        );

        Ok(PortfolioProjection {
            fixed_id: self.fixed.id,
            variable_id: self.variable.id,
            fixed,
            variable,
            handoff,
        })
    }
}

impl PortfolioProjection {
    /// fixed balance, zero from the hand-off day on
    pub fn fixed_principal_on(&self, date: NaiveDate) -> Money {
        if date >= self.handoff.date {
            Money::ZERO
        } else {
            self.fixed.principal_on(date)
        }
    }

    /// combined principal of both tranches on `date`
    pub fn principal_on(&self, date: NaiveDate) -> Money {
        self.fixed_principal_on(date) + self.variable.principal_on(date)
    }

    pub fn total_interest(&self) -> Money {
        self.fixed.total_interest() + self.variable.total_interest()
    }

    /// date the whole loan is paid off
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        self.variable.final_date()
    }

    /// fixed, variable and offset statement lines up to `until`
    ///
    /// the fixed account closes with a transfer to the variable account on the
    /// hand-off day, the same day the variable account redraws that amount.
    pub fn statement(&self, portfolio: &LoanPortfolio, until: NaiveDate) -> Result<Statement> {
        let fixed = Statement::from_schedule(&self.fixed, &portfolio.fixed.statement_source(), until)?;
        let variable = Statement::from_schedule(&self.variable, &portfolio.variable.statement_source(), until)?;

        let mut statements = vec![fixed];
        if self.handoff.amount.is_positive() && self.handoff.date <= until {
            statements.push(Statement::transfer_out(
                FIXED_ACCOUNT,
                VARIABLE_ACCOUNT,
                self.handoff.amount,
                self.handoff.date,
            ));
        }
        statements.push(variable);
        if portfolio.schedule_start <= until {
            statements.push(Statement::offset_opening(portfolio.offset, portfolio.schedule_start));
        }

        let statement = Statement::merge(statements);
        debug!(
            target: "loan.tranche",
            until = %until,
            entries = statement.entries.len(),
            fixed_balance = %statement.balance_on(FIXED_ACCOUNT, until),
            "portfolio statement built"
        );
        Ok(statement)
    }
}
