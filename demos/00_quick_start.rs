/// quick start - plan a repayment and project the loan
use home_loan_sim::{simulate, Cycle, Money, Rate, RecurringPaymentPlanner, SimulationConfig};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // $600,000 over 30 years at 6.1%, paid fortnightly
    let planner = RecurringPaymentPlanner::new(
        "home",
        dec!(30),
        Cycle::Fortnightly.periods_per_year(),
        Money::from_major(600_000),
        Rate::from_percent(dec!(6.1)),
    );
    let repayment = planner.periodic_payment().ok_or("nothing to plan")?;
    println!("planned fortnightly repayment: {}", repayment.round());

    // bank defaults: month-end interest, fortnightly repayments
    let config = SimulationConfig::builder()
        .principal(Money::from_major(600_000))
        .offset(Money::from_major(20_000))
        .interest_percent(dec!(6.1))
        .repayment(repayment.round())
        .build()?;

    let schedule = simulate(&config)?;
    println!(
        "paid off on {:?} after {} rows, total interest {}",
        schedule.final_date(),
        schedule.len(),
        schedule.total_interest().round()
    );

    Ok(())
}
