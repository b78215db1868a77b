use chrono::NaiveDate;
use home_loan_sim::{
    compare_scenarios, simulate, LoanPortfolio, Money, Rate, Scenario, ScenarioSettings, SimulationConfig, Statement,
    StatementSource, Tranche, TrancheKind,
};
use home_loan_sim::statement::{FIXED_ACCOUNT, OFFSET_ACCOUNT, VARIABLE_ACCOUNT};
use rust_decimal_macros::dec;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn portfolio() -> LoanPortfolio {
    LoanPortfolio {
        loan_start: day(2023, 2, 1),
        schedule_start: day(2024, 2, 1),
        fixed: Tranche::new(
            TrancheKind::Fixed,
            Money::from_major(320_000),
            Rate::from_percent(dec!(5.9)),
            Money::from_major(1_000),
        ),
        variable: Tranche::new(
            TrancheKind::Variable,
            Money::from_major(480_000),
            Rate::from_percent(dec!(6.4)),
            Money::from_major(2_000),
        ),
        offset: Money::from_major(60_000),
        fixed_term_end: day(2026, 2, 1),
        schedule_end: None,
    }
}

#[test]
fn test_portfolio_balance_only_falls_between_events() {
    let projection = portfolio().project().unwrap();

    assert!(projection.fixed.verify_balance().is_ok());
    assert!(projection.variable.verify_balance().is_ok());

    let before = projection.principal_on(day(2026, 1, 31));
    let after = projection.principal_on(day(2026, 2, 1));
    let moved = (before - after).abs();
    assert!(moved < Money::from_major(5_000), "hand-off changed the total by {moved}");

    assert_eq!(projection.payoff_date(), projection.variable.final_date());
    assert_eq!(
        projection.total_interest(),
        projection.fixed.total_interest() + projection.variable.total_interest()
    );
}

#[test]
fn test_portfolio_statement_tracks_both_tranches() {
    let portfolio = portfolio();
    let projection = portfolio.project().unwrap();
    let cutoff = day(2027, 2, 1);
    let statement = projection.statement(&portfolio, cutoff).unwrap();

    assert!(statement.entries.windows(2).all(|pair| pair[0].date <= pair[1].date));
    assert_eq!(statement.balance_on(OFFSET_ACCOUNT, cutoff), portfolio.offset);
    assert_eq!(
        statement.balance_on(VARIABLE_ACCOUNT, cutoff),
        -projection.variable.principal_on(cutoff)
    );

    // fixed account is closed from the hand-off day on
    let handoff = projection.handoff.date;
    for date in [handoff, day(2026, 2, 2), cutoff] {
        assert_eq!(statement.balance_on(FIXED_ACCOUNT, date), Money::ZERO);
    }
    assert!(statement.balance_on(FIXED_ACCOUNT, handoff.pred_opt().unwrap()).is_negative());

    let dates = [portfolio.schedule_start, day(2026, 2, 2), cutoff];
    let totals = statement.total_balance_over_time(Some(&dates));
    assert_eq!(
        totals[0].1,
        portfolio.offset - portfolio.fixed.principal - portfolio.variable.principal
    );
    for (date, total) in &totals {
        assert_eq!(*total, portfolio.offset - projection.principal_on(*date));
    }
    assert!(totals[2].1 > totals[0].1);
}

#[test]
fn test_statement_lines_explain_every_balance_change() {
    let portfolio = portfolio();
    let projection = portfolio.project().unwrap();
    let source = StatementSource {
        account: VARIABLE_ACCOUNT.to_string(),
        interest_cycle: portfolio.variable.interest_cycle,
        repayment_cycle: portfolio.variable.repayment_cycle,
        extra_repayment: Money::from_major(500),
    };
    let statement = Statement::from_schedule(&projection.variable, &source, day(2027, 2, 1)).unwrap();

    for pair in statement.entries.windows(2) {
        assert_eq!(pair[1].balance - pair[0].balance, pair[1].credit + pair[1].debit);
    }
}

#[test]
fn test_scenarios_rank_as_expected() {
    let base = SimulationConfig::bank_default(
        Money::from_major(450_000),
        Rate::from_percent(dec!(6.1)),
        Money::from_major(1_600),
        day(2024, 7, 1),
    )
    .with_offset(Money::from_major(30_000));
    let settings = ScenarioSettings {
        extra_repayment: Money::from_major(300),
        ..ScenarioSettings::default()
    };

    let comparison = compare_scenarios(&base, &settings, &Scenario::ALL).unwrap();
    assert_eq!(comparison.outcomes.len(), Scenario::ALL.len());

    for scenario in [Scenario::Hope, Scenario::Save, Scenario::Invest] {
        assert!(comparison.days_saved(scenario).unwrap() > 0, "{scenario} should finish sooner");
    }
    for scenario in [Scenario::WithoutExtraRepayment, Scenario::Fear, Scenario::Spend] {
        assert!(comparison.days_saved(scenario).unwrap() < 0, "{scenario} should finish later");
    }

    let baseline = simulate(&base).unwrap();
    assert_eq!(comparison.baseline().unwrap().schedule, baseline);
}
