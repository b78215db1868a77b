pub mod config;
pub mod cycle;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod payments;
pub mod scenarios;
pub mod schedule;
pub mod simulator;
pub mod state;
pub mod statement;
pub mod tranche;

// re-export key types
pub use config::{ExtraWin, LeftoverInjection, SimulationBuilder, SimulationConfig};
pub use cycle::{increment, Cycle};
pub use decimal::{Money, Rate};
pub use errors::{Result, SimulationError};
pub use interest::{year_fraction, InterestCalculation, InterestCalculator, MeanBalanceAccrual, OwingHistory};
pub use payments::{plan_payment, RecurringPaymentPlanner, WindfallSplit};
pub use scenarios::{compare_scenarios, Scenario, ScenarioComparison, ScenarioOutcome, ScenarioSettings};
pub use schedule::{CalendarSpan, Schedule, ScheduleRow};
pub use simulator::{simulate, ScheduleSummary, MAX_SIMULATION_YEARS};
pub use state::{DayEvents, LoanState};
pub use statement::{demo_statement, DemoSettings, EntryLabel, Statement, StatementEntry, StatementSource};
pub use tranche::{Handoff, LoanPortfolio, PortfolioProjection, Tranche, TrancheId, TrancheKind};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
