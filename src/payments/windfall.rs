use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// how a windfall was divided between the loan and the borrower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WindfallSplit {
    pub for_loan: Money,
    pub surplus: Money,
}

impl WindfallSplit {
    /// pay down at most `principal`, anything above it is surplus
    pub fn split(amount: Money, principal: Money) -> Self {
        let for_loan = clamp_to_principal(amount, principal);
        Self {
            for_loan,
            surplus: amount - for_loan,
        }
    }

    pub fn total(&self) -> Money {
        self.for_loan + self.surplus
    }
}

/// a payment can never take the principal below zero
pub fn clamp_to_principal(amount: Money, principal: Money) -> Money {
    amount.min(principal.floor_zero()).floor_zero()
}
