use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::decimal::Money;
use crate::errors::{Result, SimulationError};
use crate::schedule::{Schedule, ScheduleRow};
use crate::state::LoanState;

/// simulated years after which a run is considered runaway
pub const MAX_SIMULATION_YEARS: u32 = 100;

const MAX_SIMULATION_DAYS: i64 = MAX_SIMULATION_YEARS as i64 * 365;

/// run the day-stepped projection for `config`
///
/// The first row is always the day-zero state. After that a row is emitted for
/// every day with interest, a redraw, a repayment or a windfall, plus the
/// schedule end if one is set. Fails with [`SimulationError::DidNotFinish`]
/// when the loan is still open after [`MAX_SIMULATION_YEARS`].
pub fn simulate(config: &SimulationConfig) -> Result<Schedule> {
    config.validate()?;

    let mut state = LoanState::new(config);
    let mut rows = vec![ScheduleRow::initial(
        config.loan_start,
        config.schedule_start,
        config.principal,
        config.extra_win.is_some(),
    )];

    while !state.is_settled(config) {
        if (state.curr_date - config.schedule_start).num_days() >= MAX_SIMULATION_DAYS {
            warn!(
                target: "loan.sim",
                date = %state.curr_date,
                principal = %state.principal,
                repayment = %config.repayment,
                "loan did not finish"
            );
            return Err(SimulationError::DidNotFinish {
                years: MAX_SIMULATION_YEARS,
                date: state.curr_date,
                principal: state.principal,
            });
        }

        let events = state.step(config)?;
        if events.is_reportable() {
            rows.push(ScheduleRow::from_events(
                state.curr_date,
                config.loan_start,
                config.schedule_start,
                &events,
                state.principal,
            ));
        }
        if events.matured {
            break;
        }
    }

    let schedule = Schedule::new(rows);
    info!(
        target: "loan.sim",
        start = %config.schedule_start,
        end = ?schedule.final_date(),
        rows = schedule.len(),
        total_interest = %schedule.total_interest(),
        total_repayment = %schedule.total_repayment(),
        final_principal = %schedule.final_principal(),
        "simulation finished"
    );
    Ok(schedule)
}

/// headline figures of a finished run
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduleSummary {
    pub end_date: Option<NaiveDate>,
    pub duration_days: i64,
    pub total_interest: Money,
    pub total_repayment: Money,
    pub total_redraw: Money,
    pub total_extra_win_for_loan: Money,
    pub total_extra_win_surplus: Money,
    pub final_principal: Money,
}

impl ScheduleSummary {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            end_date: schedule.final_date(),
            duration_days: schedule.duration_days(),
            total_interest: schedule.total_interest(),
            total_repayment: schedule.total_repayment(),
            total_redraw: schedule.total_redraw(),
            total_extra_win_for_loan: schedule.total_extra_win_for_loan(),
            total_extra_win_surplus: schedule.total_extra_win_surplus(),
            final_principal: schedule.final_principal(),
        }
    }
}
