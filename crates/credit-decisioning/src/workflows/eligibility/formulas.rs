//! Affordability arithmetic for the daily simple-interest product.

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Total repayment per unit of principal: `1 + rate/100 * days`.
pub fn repayment_multiplier(daily_rate_pct: f64, tenure_days: u32) -> f64 {
    1.0 + daily_rate_pct / 100.0 * f64::from(tenure_days)
}

/// FOIR as a percentage, zero when net income is zero.
pub fn foir_pct(existing_emi: f64, proposed_emi: f64, net_income: f64) -> f64 {
    if net_income == 0.0 {
        return 0.0;
    }
    round2((existing_emi + proposed_emi) / net_income * 100.0)
}

/// Total repayment for a requested principal, rounded to the rupee.
pub fn proposed_emi(principal: f64, daily_rate_pct: f64, tenure_days: u32) -> f64 {
    (principal * repayment_multiplier(daily_rate_pct, tenure_days)).round()
}

/// Headroom left under the FOIR cap after existing obligations. May be negative.
pub fn max_repayment_capacity(net_income: f64, max_foir_pct: f64, existing_emi: f64) -> f64 {
    net_income * max_foir_pct / 100.0 - existing_emi
}

/// Largest principal whose total repayment fits the capacity, floored at zero.
pub fn eligible_loan_amount(capacity: f64, daily_rate_pct: f64, tenure_days: u32) -> u64 {
    let multiplier = repayment_multiplier(daily_rate_pct, tenure_days);
    if capacity <= 0.0 || multiplier <= 0.0 {
        return 0;
    }
    (capacity / multiplier).round() as u64
}
