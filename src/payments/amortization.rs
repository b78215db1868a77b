use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::{Money, Rate};

/// constant periodic payment that amortizes `principal` to zero
///
/// `term_years * periods_per_year` periods at `annual_rate / periods_per_year`
/// each. `None` when there is nothing to amortize (`principal <= 0`), no
/// period to do it in, or the growth factor leaves the decimal range. A zero
/// rate falls back to straight-line `principal / n`.
pub fn plan_payment(
    term_years: Decimal,
    periods_per_year: Decimal,
    principal: Money,
    annual_rate: Rate,
) -> Option<Money> {
    let n = term_years * periods_per_year;
    if !principal.is_positive() || n.is_zero() {
        return None;
    }

    let r = annual_rate.per_period(periods_per_year);
    if r.is_zero() {
        return Some(principal / n);
    }

    let growth = compound_factor(r, n)?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return None;
    }

    // growth / (growth - 1) stays near one, so divide before scaling by principal
    let payment = r
        .checked_mul(growth.checked_div(denominator)?)?
        .checked_mul(principal.as_decimal())?;
    Some(Money::from_decimal(payment))
}

/// (1 + r)^n for a possibly fractional `n`, `None` past the decimal range
///
/// integer part by repeated multiplication, remainder through `powd`
fn compound_factor(r: Decimal, n: Decimal) -> Option<Decimal> {
    let base = Decimal::ONE + r;
    let whole = n.trunc();
    let fraction = n - whole;

    let mut factor = Decimal::ONE;
    let mut remaining = whole;
    while remaining >= Decimal::ONE {
        factor = factor.checked_mul(base)?;
        remaining -= Decimal::ONE;
    }

    if fraction.is_zero() {
        Some(factor)
    } else {
        factor.checked_mul(base.checked_powd(fraction)?)
    }
}

/// reference repayment for a loan, not consumed by the simulator itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPaymentPlanner {
    pub label: String,
    pub term_years: Decimal,
    pub periods_per_year: Decimal,
    pub principal: Money,
    pub annual_rate: Rate,
}

impl RecurringPaymentPlanner {
    pub fn new(
        label: impl Into<String>,
        term_years: Decimal,
        periods_per_year: Decimal,
        principal: Money,
        annual_rate: Rate,
    ) -> Self {
        let planner = Self {
            label: label.into(),
            term_years,
            periods_per_year,
            principal,
            annual_rate,
        };
        debug!(
            target: "loan.planner",
            label = %planner.label,
            periods = %planner.periods(),
            payment = ?planner.periodic_payment(),
            "planned recurring payment"
        );
        planner
    }

    /// total number of payments
    pub fn periods(&self) -> Decimal {
        self.term_years * self.periods_per_year
    }

    pub fn per_period_rate(&self) -> Decimal {
        self.annual_rate.per_period(self.periods_per_year)
    }

    pub fn periodic_payment(&self) -> Option<Money> {
        plan_payment(self.term_years, self.periods_per_year, self.principal, self.annual_rate)
    }

    /// periodic payment expressed per calendar month
    pub fn monthly_equivalent(&self) -> Option<Money> {
        self.periodic_payment()
            .map(|payment| payment * self.periods_per_year / Decimal::from(12))
    }

    /// total paid over the whole term
    pub fn total_paid(&self) -> Option<Money> {
        self.periodic_payment().map(|payment| payment * self.periods())
    }
}
