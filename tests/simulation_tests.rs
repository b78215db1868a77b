use chrono::NaiveDate;
use home_loan_sim::{
    plan_payment, simulate, Cycle, ExtraWin, LeftoverInjection, Money, Rate, Schedule, SimulationConfig,
    SimulationError,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn busy_config() -> SimulationConfig {
    SimulationConfig::bank_default(
        Money::from_major(250_000),
        Rate::from_percent(dec!(6.2)),
        Money::from_major(1_100),
        day(2024, 3, 5),
    )
    .with_offset(Money::from_major(15_000))
    .with_leftover(LeftoverInjection {
        incoming: day(2026, 9, 1),
        amount: Some(Money::from_major(40_000)),
        repayment: Some(Money::from_major(600)),
    })
    .with_extra_win(ExtraWin {
        amount: Money::from_major(5_000),
        cycle: Cycle::Yearly,
        duration_days: Some(3_650),
    })
}

#[rstest]
#[case(dec!(15), Cycle::Fortnightly, 500_000, dec!(5))]
#[case(dec!(20), Cycle::MonthlyAverage, 2_000_000, dec!(8))]
#[case(dec!(25), Cycle::MonthlyAverage, 1_000_000, dec!(6))]
fn test_planned_payment_retires_loan_on_time(
    #[case] term_years: Decimal,
    #[case] cycle: Cycle,
    #[case] principal: i64,
    #[case] percent: Decimal,
) {
    let principal = Money::from_major(principal);
    let rate = Rate::from_percent(percent);
    let payment = plan_payment(term_years, cycle.periods_per_year(), principal, rate).unwrap();

    let config = SimulationConfig::uniform(principal, rate, payment, day(2024, 1, 1), cycle);
    let schedule = simulate(&config).unwrap();

    assert_eq!(schedule.final_principal(), Money::ZERO);
    assert_eq!(schedule.loan_years().round(), term_years);
}

#[test]
fn test_first_row_is_day_zero() {
    let config = busy_config();
    let schedule = simulate(&config).unwrap();
    let first = schedule.first().unwrap();

    assert_eq!(first.date, config.schedule_start);
    assert_eq!(first.principal, config.principal);
    assert_eq!(first.interest, Some(Money::ZERO));
    assert_eq!(first.redraw, Some(Money::ZERO));
    assert_eq!(first.repayment, Some(Money::ZERO));
    assert_eq!(first.extra_win_for_loan, Some(Money::ZERO));
    assert_eq!(first.schedule_years, Decimal::ZERO);
}

#[test]
fn test_principal_is_conserved_row_to_row() {
    let schedule = simulate(&busy_config()).unwrap();

    assert!(schedule.verify_balance().is_ok());
    assert!(schedule.iter().all(|row| !row.principal.is_negative()));
    assert!(schedule.rows.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[test]
fn test_leftover_is_injected_once() {
    let config = busy_config();
    let schedule = simulate(&config).unwrap();

    let redraws: Vec<(NaiveDate, Money)> = schedule.redraws().collect();
    assert_eq!(redraws, vec![(day(2026, 9, 1), Money::from_major(40_000))]);

    let topped_up = schedule
        .iter()
        .filter(|row| row.date > day(2026, 9, 1))
        .filter_map(|row| row.repayment)
        .take(5)
        .collect::<Vec<_>>();
    assert_eq!(topped_up, vec![Money::from_major(1_700); 5]);
}

#[test]
fn test_windfall_splits_into_loan_and_surplus() {
    let config = SimulationConfig::uniform(
        Money::from_major(1_500),
        Rate::ZERO,
        Money::from_major(100),
        day(2024, 1, 1),
        Cycle::Monthly1stOfMonth,
    )
    .with_extra_win(ExtraWin {
        amount: Money::from_major(2_000),
        cycle: Cycle::Yearly,
        duration_days: Some(730),
    });

    let schedule = simulate(&config).unwrap();
    let wins: Vec<_> = schedule
        .iter()
        .skip(1)
        .filter_map(|row| row.extra_win_for_loan.zip(row.extra_win_surplus).map(|w| (row.date, w)))
        .collect();

    assert_eq!(
        wins,
        vec![
            (day(2024, 12, 31), (Money::from_major(400), Money::from_major(1_600))),
            (day(2025, 12, 31), (Money::ZERO, Money::from_major(2_000))),
        ]
    );
    assert_eq!(schedule.first_at_or_below(Money::ZERO).unwrap().date, day(2024, 12, 31));
    assert_eq!(schedule.final_date(), Some(day(2025, 12, 31)));
    assert_eq!(schedule.total_repayment(), Money::from_major(1_100));
    assert_eq!(schedule.total_extra_win_surplus(), Money::from_major(3_600));
}

fn plain_config() -> SimulationConfig {
    SimulationConfig::bank_default(
        Money::from_major(250_000),
        Rate::from_percent(dec!(6.2)),
        Money::from_major(1_100),
        day(2024, 3, 5),
    )
    .with_leftover(LeftoverInjection {
        incoming: day(2026, 9, 1),
        amount: Some(Money::from_major(40_000)),
        repayment: Some(Money::from_major(600)),
    })
}

/// (duration, interest, repayment) must all strictly grow from one run to the next
fn assert_strictly_increasing(runs: &[Schedule], what: &str) {
    for pair in runs.windows(2) {
        let (cheap, dear) = (&pair[0], &pair[1]);
        assert!(cheap.duration_days() < dear.duration_days(), "{what}: duration");
        assert!(cheap.total_interest() < dear.total_interest(), "{what}: interest");
        assert!(cheap.total_repayment() < dear.total_repayment(), "{what}: repayment");
    }
}

#[test]
fn test_more_offset_finishes_sooner_and_cheaper() {
    let runs: Vec<Schedule> = [150_000, 60_000, 20_000, 0]
        .into_iter()
        .map(|offset| simulate(&plain_config().with_offset(Money::from_major(offset))).unwrap())
        .collect();

    assert_strictly_increasing(&runs, "shrinking offset");
}

#[test]
fn test_higher_rate_finishes_later_and_costs_more() {
    let runs: Vec<Schedule> = [dec!(4), dec!(6), dec!(8)]
        .into_iter()
        .map(|percent| simulate(&plain_config().with_interest_rate(Rate::from_percent(percent))).unwrap())
        .collect();

    assert_strictly_increasing(&runs, "rising rate");
}

#[test]
fn test_repayment_stash_flag_has_no_effect() {
    let config = busy_config();
    let mut stashed = config.clone();
    stashed.repayment_use_stash = true;

    assert_eq!(simulate(&config).unwrap(), simulate(&stashed).unwrap());
}

#[test]
fn test_repayment_below_interest_runs_away() {
    let config = SimulationConfig::bank_default(
        Money::from_major(800_000),
        Rate::from_percent(dec!(7)),
        Money::from_major(1_500),
        day(2024, 1, 1),
    );

    match simulate(&config) {
        Err(SimulationError::DidNotFinish { years, date, principal }) => {
            assert_eq!(years, 100);
            assert!(date >= day(2123, 12, 1));
            assert!(principal > Money::from_major(800_000));
        }
        other => panic!("expected runaway error, got {other:?}"),
    }
}

#[test]
fn test_config_round_trips_through_json() {
    let config = busy_config();
    let json = config.to_json().unwrap();
    let parsed = SimulationConfig::from_json(&json).unwrap();

    assert_eq!(parsed, config);
    assert_eq!(simulate(&parsed).unwrap().final_date(), simulate(&config).unwrap().final_date());
}
