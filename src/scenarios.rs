use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::{ExtraWin, SimulationConfig};
use crate::cycle::Cycle;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::schedule::Schedule;
use crate::simulator::{simulate, ScheduleSummary};

/// hypothetical variations of a baseline projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Baseline,
    /// only the contractual part of the repayment
    WithoutExtraRepayment,
    /// rate falls by the configured shift
    Hope,
    /// rate rises by the configured shift
    Fear,
    /// lump sum parked in the offset account
    Save,
    /// lump sum taken out of the offset account
    Spend,
    /// periodic investment returns thrown at the loan
    Invest,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::Baseline,
        Scenario::WithoutExtraRepayment,
        Scenario::Hope,
        Scenario::Fear,
        Scenario::Save,
        Scenario::Spend,
        Scenario::Invest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::WithoutExtraRepayment => "without extra repayment",
            Scenario::Hope => "hope",
            Scenario::Fear => "fear",
            Scenario::Save => "save",
            Scenario::Spend => "spend",
            Scenario::Invest => "invest",
        }
    }

    /// derive this scenario's parameters from the baseline
    pub fn apply(&self, base: &SimulationConfig, settings: &ScenarioSettings) -> SimulationConfig {
        let config = base.clone();
        match self {
            Scenario::Baseline => config,
            Scenario::WithoutExtraRepayment => {
                let repayment = (base.repayment - settings.extra_repayment).floor_zero();
                config.with_repayment(repayment)
            }
            Scenario::Hope => {
                let rate = (base.interest_rate - settings.rate_shift).max(Rate::ZERO);
                config.with_interest_rate(rate)
            }
            Scenario::Fear => config.with_interest_rate(base.interest_rate + settings.rate_shift),
            Scenario::Save => config.with_offset(base.offset + settings.lump_sum),
            Scenario::Spend => config.with_offset((base.offset - settings.lump_sum).floor_zero()),
            Scenario::Invest => config.with_extra_win(ExtraWin {
                amount: settings.investment_return,
                cycle: settings.investment_cycle,
                duration_days: settings.investment_years.map(|years| years * 365),
            }),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// knobs shared by the hypothetical scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSettings {
    /// voluntary part of the baseline repayment
    pub extra_repayment: Money,
    pub rate_shift: Rate,
    pub lump_sum: Money,
    pub investment_return: Money,
    pub investment_cycle: Cycle,
    pub investment_years: Option<u32>,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            extra_repayment: Money::ZERO,
            rate_shift: Rate::from_bps(100),
            lump_sum: Money::from_major(50_000),
            investment_return: Money::from_major(10_000),
            investment_cycle: Cycle::Yearly,
            investment_years: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub config: SimulationConfig,
    pub schedule: Schedule,
    pub summary: ScheduleSummary,
}

/// side-by-side results, baseline first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl ScenarioComparison {
    pub fn get(&self, scenario: Scenario) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.scenario == scenario)
    }

    pub fn baseline(&self) -> Option<&ScenarioOutcome> {
        self.get(Scenario::Baseline)
    }

    /// interest avoided relative to baseline, negative when the scenario costs more
    pub fn interest_saved(&self, scenario: Scenario) -> Option<Money> {
        let baseline = self.baseline()?;
        let outcome = self.get(scenario)?;
        Some(baseline.summary.total_interest - outcome.summary.total_interest)
    }

    /// days the loan finishes earlier than baseline
    pub fn days_saved(&self, scenario: Scenario) -> Option<i64> {
        let baseline = self.baseline()?;
        let outcome = self.get(scenario)?;
        Some(baseline.summary.duration_days - outcome.summary.duration_days)
    }
}

/// simulate the baseline and every requested scenario independently
pub fn compare_scenarios(
    base: &SimulationConfig,
    settings: &ScenarioSettings,
    scenarios: &[Scenario],
) -> Result<ScenarioComparison> {
    let mut requested = vec![Scenario::Baseline];
    requested.extend(scenarios.iter().copied().filter(|s| *s != Scenario::Baseline));

    let mut outcomes = Vec::with_capacity(requested.len());
    for scenario in requested {
        let config = scenario.apply(base, settings);
        let schedule = simulate(&config)?;
        let summary = ScheduleSummary::from_schedule(&schedule);
        info!(
            target: "loan.scenario",
            scenario = %scenario,
            days = summary.duration_days,
            total_interest = %summary.total_interest,
            "scenario projected"
        );
        outcomes.push(ScenarioOutcome {
            scenario,
            config,
            schedule,
            summary,
        });
    }

    Ok(ScenarioComparison { outcomes })
}
