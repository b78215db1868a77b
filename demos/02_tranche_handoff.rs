/// tranche hand-off - fixed tranche rolls into the variable tranche
use chrono::NaiveDate;
use home_loan_sim::{LoanPortfolio, Money, Rate, Tranche, TrancheKind};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== tranche hand-off ===\n");

    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("bad date");
    let portfolio = LoanPortfolio {
        loan_start: date(2023, 2, 1)?,
        schedule_start: date(2024, 2, 1)?,
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
        fixed_term_end: date(2026, 2, 1)?,
        schedule_end: None,
    };

    let projection = portfolio.project()?;
    println!(
        "fixed rolls {} into variable on {}",
        projection.handoff.amount.round(),
        projection.handoff.date
    );
    println!("loan paid off on {:?}", projection.payoff_date());
    println!("total interest {}", projection.total_interest().round());

    // statement lines up to a year after the hand-off
    let cutoff = date(2027, 2, 1)?;
    let statement = projection.statement(&portfolio, cutoff)?;

    for (date, total) in statement.total_balance_over_time(None).iter().step_by(20) {
        println!("{date}  {}", total.round());
    }

    Ok(())
}
