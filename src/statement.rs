use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::SimulationConfig;
use crate::cycle::Cycle;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};
use crate::payments::plan_payment;
use crate::schedule::Schedule;
use crate::simulator::simulate;

pub const FIXED_ACCOUNT: &str = "Fixed";
pub const VARIABLE_ACCOUNT: &str = "Variable";
pub const OFFSET_ACCOUNT: &str = "Offset";

/// kind of statement line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryLabel {
    Redraw,
    Interest,
    Repayment,
    ExtraRepayment,
    ExtraWin,
    /// balance moved to another account
    Transfer,
    OffsetUp,
}

/// a statement line in bank-export form
///
/// loan balances are negative (money owed), offset balances positive, so
/// summing accounts gives the net position. Exports that list a loan balance
/// as the positive principal owing match `balance.abs()` of loan lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEntry {
    pub description: String,
    pub credit: Money,
    pub debit: Money,
    pub balance: Money,
    pub date: NaiveDate,
    pub label: EntryLabel,
    pub account: String,
}

/// how a schedule is rendered into statement lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSource {
    pub account: String,
    pub interest_cycle: Cycle,
    pub repayment_cycle: Cycle,
    /// voluntary part of each repayment, shown as its own line
    pub extra_repayment: Money,
}

impl StatementSource {
    pub fn for_config(account: impl Into<String>, config: &SimulationConfig) -> Self {
        Self {
            account: account.into(),
            interest_cycle: config.interest_cycle,
            repayment_cycle: config.repayment_cycle,
            extra_repayment: Money::ZERO,
        }
    }

    pub fn with_extra_repayment(mut self, extra_repayment: Money) -> Self {
        self.extra_repayment = extra_repayment;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    pub entries: Vec<StatementEntry>,
}

impl Statement {
    /// statement lines for every event in `schedule` up to and including `until`
    pub fn from_schedule(schedule: &Schedule, source: &StatementSource, until: NaiveDate) -> Result<Self> {
        let first = schedule.first().ok_or_else(|| SimulationError::CalculationError {
            message: "cannot build a statement from an empty schedule".to_string(),
        })?;

        let mut entries = vec![StatementEntry {
            description: "initial redraw".to_string(),
            credit: Money::ZERO,
            debit: -first.principal,
            balance: -first.principal,
            date: first.date,
            label: EntryLabel::Redraw,
            account: source.account.clone(),
        }];

        for row in schedule.iter().skip(1) {
            if row.date > until {
                break;
            }

            let mut owing = row.principal_before();
            let mut push = |description: String, credit: Money, debit: Money, label: EntryLabel, after: Money| {
                entries.push(StatementEntry {
                    description,
                    credit,
                    debit,
                    balance: -after,
                    date: row.date,
                    label,
                    account: source.account.clone(),
                });
            };

            if let Some(interest) = row.interest.filter(|m| m.is_positive()) {
                owing += interest;
                let description = format!("interest ({})", source.interest_cycle.label());
                push(description, Money::ZERO, -interest, EntryLabel::Interest, owing);
            }

            if let Some(redraw) = row.redraw.filter(|m| m.is_positive()) {
                owing += redraw;
                push("redraw".to_string(), Money::ZERO, -redraw, EntryLabel::Redraw, owing);
            }

            if let Some(total) = row.repayment.filter(|m| m.is_positive()) {
                let extra = source.extra_repayment.min(total);
                owing -= total - extra;
                let description = format!("repayment ({})", source.repayment_cycle.label());
                push(description, total - extra, Money::ZERO, EntryLabel::Repayment, owing);
                if extra.is_positive() {
                    owing -= extra;
                    let description = format!("extra repayment ({})", source.repayment_cycle.label());
                    push(description, extra, Money::ZERO, EntryLabel::ExtraRepayment, owing);
                }
            }

            if let Some(for_loan) = row.extra_win_for_loan.filter(|m| m.is_positive()) {
                owing -= for_loan;
                push("extra win".to_string(), for_loan, Money::ZERO, EntryLabel::ExtraWin, owing);
            }
        }

        Ok(Self { entries })
    }

    /// single opening line for an offset account
    pub fn offset_opening(balance: Money, date: NaiveDate) -> Self {
        let description = if balance.is_zero() { "no offset" } else { "offset deposit" };
        Self {
            entries: vec![StatementEntry {
                description: description.to_string(),
                credit: balance,
                debit: Money::ZERO,
                balance,
                date,
                label: EntryLabel::OffsetUp,
                account: OFFSET_ACCOUNT.to_string(),
            }],
        }
    }

    /// closing line that moves the whole remaining `amount` of `account` elsewhere
    pub fn transfer_out(account: impl Into<String>, to: &str, amount: Money, date: NaiveDate) -> Self {
        Self {
            entries: vec![StatementEntry {
                description: format!("transfer to {}", to.to_lowercase()),
                credit: amount,
                debit: Money::ZERO,
                balance: Money::ZERO,
                date,
                label: EntryLabel::Transfer,
                account: account.into(),
            }],
        }
    }

    /// concatenate and stable-sort by date, same-day lines keep their order
    pub fn merge(statements: impl IntoIterator<Item = Statement>) -> Self {
        let mut entries: Vec<StatementEntry> = statements.into_iter().flat_map(|s| s.entries).collect();
        entries.sort_by_key(|entry| entry.date);
        Self { entries }
    }

    /// end-of-day balance per date for one account
    pub fn balance_over_time(&self, account: &str) -> Vec<(NaiveDate, Money)> {
        let mut balances: Vec<(NaiveDate, Money)> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.account == account) {
            match balances.last_mut() {
                Some((date, balance)) if *date == entry.date => *balance = entry.balance,
                _ => balances.push((entry.date, entry.balance)),
            }
        }
        balances
    }

    /// last balance of `account` on or before `date`, zero before its first line
    pub fn balance_on(&self, account: &str, date: NaiveDate) -> Money {
        self.balance_over_time(account)
            .into_iter()
            .take_while(|(d, _)| *d <= date)
            .last()
            .map_or(Money::ZERO, |(_, balance)| balance)
    }

    /// fixed + variable + offset on each date, every statement date when `dates` is `None`
    pub fn total_balance_over_time(&self, dates: Option<&[NaiveDate]>) -> Vec<(NaiveDate, Money)> {
        let dates: Vec<NaiveDate> = match dates {
            Some(dates) => dates.to_vec(),
            None => self
                .entries
                .iter()
                .filter(|e| [FIXED_ACCOUNT, VARIABLE_ACCOUNT, OFFSET_ACCOUNT].contains(&e.account.as_str()))
                .map(|e| e.date)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        let fixed = self.balance_over_time(FIXED_ACCOUNT);
        let variable = self.balance_over_time(VARIABLE_ACCOUNT);
        let offset = self.balance_over_time(OFFSET_ACCOUNT);

        dates
            .into_iter()
            .map(|date| {
                let total = find_balance(&fixed, date) + find_balance(&variable, date) + find_balance(&offset, date);
                (date, total)
            })
            .collect()
    }
}

fn find_balance(balances: &[(NaiveDate, Money)], date: NaiveDate) -> Money {
    let end = balances.partition_point(|(d, _)| *d <= date);
    if end == 0 {
        Money::ZERO
    } else {
        balances[end - 1].1
    }
}

/// parameters of the synthetic demo account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoSettings {
    pub loan_amount: Money,
    pub fixed_fraction: Decimal,
    pub fixed_rate: Rate,
    pub variable_rate: Rate,
    pub term_years: Decimal,
    /// share of the variable repayment shown as extra repayment
    pub variable_extra_fraction: Decimal,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            loan_amount: Money::from_major(1_000_000),
            fixed_fraction: dec!(0.4),
            fixed_rate: Rate::from_percent(dec!(5.5)),
            variable_rate: Rate::from_percent(dec!(6.5)),
            term_years: dec!(15),
            variable_extra_fraction: dec!(0.3),
        }
    }
}

/// statement of a made-up fixed/variable loan between `start` and `end`
pub fn demo_statement(start: NaiveDate, end: NaiveDate, settings: &DemoSettings) -> Result<Statement> {
    if end < start {
        return Err(SimulationError::InvalidDate {
            message: format!("demo ends {end} before it starts {start}"),
        });
    }

    let fortnights = Cycle::Fortnightly.periods_per_year();
    let fixed_amount = settings.loan_amount * settings.fixed_fraction;
    let variable_amount = settings.loan_amount - fixed_amount;

    let plan = |principal: Money, rate: Rate| {
        plan_payment(settings.term_years, fortnights, principal, rate).ok_or_else(|| {
            SimulationError::InvalidConfiguration {
                message: format!("no repayment can be planned for {principal}"),
            }
        })
    };
    let fixed_repayment = plan(fixed_amount, settings.fixed_rate)?;
    let variable_repayment = plan(variable_amount, settings.variable_rate)?;
    let variable_extra = variable_repayment * settings.variable_extra_fraction;

    let horizon = end + Duration::days(31 * 365);
    let fixed_config = SimulationConfig::bank_default(fixed_amount, settings.fixed_rate, fixed_repayment, start)
        .with_schedule_end(horizon);
    let variable_config =
        SimulationConfig::bank_default(variable_amount, settings.variable_rate, variable_repayment, start)
            .with_schedule_end(horizon);

    let fixed = Statement::from_schedule(
        &simulate(&fixed_config)?,
        &StatementSource::for_config(FIXED_ACCOUNT, &fixed_config),
        end,
    )?;
    let variable = Statement::from_schedule(
        &simulate(&variable_config)?,
        &StatementSource::for_config(VARIABLE_ACCOUNT, &variable_config).with_extra_repayment(variable_extra),
        end,
    )?;

    Ok(Statement::merge([fixed, variable, Statement::offset_opening(Money::ZERO, start)]))
}
