pub mod amortization;
pub mod windfall;

pub use amortization::{plan_payment, RecurringPaymentPlanner};
pub use windfall::{clamp_to_principal, WindfallSplit};
