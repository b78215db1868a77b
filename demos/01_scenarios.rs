/// scenarios - compare what-ifs against a baseline projection
use chrono::NaiveDate;
use home_loan_sim::{compare_scenarios, Money, Rate, Scenario, ScenarioSettings, SimulationConfig};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== scenario comparison ===\n");

    let start = NaiveDate::from_ymd_opt(2024, 7, 1).ok_or("bad date")?;
    let base = SimulationConfig::bank_default(
        Money::from_major(450_000),
        Rate::from_percent(dec!(6.1)),
        Money::from_major(1_600),
        start,
    )
    .with_offset(Money::from_major(30_000));

    let settings = ScenarioSettings {
        extra_repayment: Money::from_major(300),
        ..ScenarioSettings::default()
    };
    let comparison = compare_scenarios(&base, &settings, &Scenario::ALL)?;

    for outcome in &comparison.outcomes {
        println!(
            "{:<24} ends {:?}  interest {:>12}  saved {:>10}",
            outcome.scenario.label(),
            outcome.summary.end_date,
            outcome.summary.total_interest.round(),
            comparison
                .interest_saved(outcome.scenario)
                .unwrap_or(Money::ZERO)
                .round()
        );
    }

    Ok(())
}
