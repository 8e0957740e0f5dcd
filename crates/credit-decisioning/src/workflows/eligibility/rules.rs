use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::config::EligibilityConfig;
use super::{CreditStanding, PolicyCheck};

const DAYS_PER_YEAR: f64 = 365.25;
const DAYS_PER_MONTH: i64 = 30;

/// Policy checks evaluated for every assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    Age,
    MinimumIncome,
    EmploymentTenure,
    CreditScore,
    Foir,
    ActiveTradelines,
}

impl PolicyRule {
    pub const ALL: [PolicyRule; 6] = [
        PolicyRule::Age,
        PolicyRule::MinimumIncome,
        PolicyRule::EmploymentTenure,
        PolicyRule::CreditScore,
        PolicyRule::Foir,
        PolicyRule::ActiveTradelines,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            PolicyRule::Age => "age",
            PolicyRule::MinimumIncome => "minimum_income",
            PolicyRule::EmploymentTenure => "employment_tenure",
            PolicyRule::CreditScore => "credit_score",
            PolicyRule::Foir => "foir",
            PolicyRule::ActiveTradelines => "active_tradelines",
        }
    }
}

/// Values every rule reads, resolved once before evaluation.
pub(crate) struct RuleSignals<'a> {
    pub evaluated_on: NaiveDate,
    pub date_of_birth: Option<NaiveDate>,
    pub employment_start: Option<NaiveDate>,
    pub net_income: f64,
    pub foir_pct: f64,
    pub max_foir_pct: f64,
    pub credit: &'a CreditStanding,
}

pub(crate) fn evaluate_rule(
    rule: PolicyRule,
    signals: &RuleSignals<'_>,
    config: &EligibilityConfig,
) -> PolicyCheck {
    let (passed, details) = match rule {
        PolicyRule::Age => age(signals, config),
        PolicyRule::MinimumIncome => minimum_income(signals, config),
        PolicyRule::EmploymentTenure => employment_tenure(signals, config),
        PolicyRule::CreditScore => credit_score(signals, config),
        PolicyRule::Foir => foir(signals),
        PolicyRule::ActiveTradelines => active_tradelines(signals, config),
    };

    PolicyCheck {
        passed,
        details,
        critical: config.is_critical(rule),
    }
}

fn age(signals: &RuleSignals<'_>, config: &EligibilityConfig) -> (bool, String) {
    let Some(dob) = signals.date_of_birth else {
        return (false, "DOB not available".to_string());
    };
    let days = (signals.evaluated_on - dob).num_days();
    if days < 0 {
        return (false, format!("date of birth {dob} is after evaluation date"));
    }
    let years = (days as f64 / DAYS_PER_YEAR).floor() as u32;
    let passed = (config.min_age_years..=config.max_age_years).contains(&years);
    let details = if passed {
        format!(
            "age {years} within {}-{}",
            config.min_age_years, config.max_age_years
        )
    } else {
        format!(
            "age {years} outside {}-{}",
            config.min_age_years, config.max_age_years
        )
    };
    (passed, details)
}

fn minimum_income(signals: &RuleSignals<'_>, config: &EligibilityConfig) -> (bool, String) {
    if signals.net_income <= 0.0 {
        return (false, "net income not available".to_string());
    }
    let passed = signals.net_income >= config.min_net_income;
    let relation = if passed { "meets" } else { "below" };
    (
        passed,
        format!(
            "net income {:.0} {relation} minimum {:.0}",
            signals.net_income, config.min_net_income
        ),
    )
}

fn employment_tenure(signals: &RuleSignals<'_>, config: &EligibilityConfig) -> (bool, String) {
    let Some(joined) = signals.employment_start else {
        return (false, "joining date not available".to_string());
    };
    let days = (signals.evaluated_on - joined).num_days();
    if days < 0 {
        return (false, format!("joining date {joined} is after evaluation date"));
    }
    let months = days / DAYS_PER_MONTH;
    let passed = months >= i64::from(config.min_employment_months);
    let relation = if passed { "meets" } else { "below" };
    (
        passed,
        format!(
            "{months} months with current employer {relation} minimum {}",
            config.min_employment_months
        ),
    )
}

fn credit_score(signals: &RuleSignals<'_>, config: &EligibilityConfig) -> (bool, String) {
    match signals.credit {
        CreditStanding::Report { score, .. } if *score > 0 => {
            let passed = *score >= config.min_credit_score;
            let relation = if passed { "meets" } else { "below" };
            (
                passed,
                format!(
                    "credit score {score} {relation} minimum {}",
                    config.min_credit_score
                ),
            )
        }
        CreditStanding::Report { hit_status, .. } => (
            false,
            format!(
                "credit score not available (bureau status {})",
                hit_status.label()
            ),
        ),
        CreditStanding::Unavailable { reason } => {
            (false, format!("credit score not available: {reason}"))
        }
    }
}

fn foir(signals: &RuleSignals<'_>) -> (bool, String) {
    let passed = signals.foir_pct <= signals.max_foir_pct;
    let relation = if passed { "within" } else { "exceeds" };
    let mut details = format!(
        "FOIR {:.2}% {relation} limit {:.2}%",
        signals.foir_pct, signals.max_foir_pct
    );
    if signals.net_income <= 0.0 {
        details.push_str(" (no net income, defaulted to 0)");
    }
    (passed, details)
}

fn active_tradelines(signals: &RuleSignals<'_>, config: &EligibilityConfig) -> (bool, String) {
    match signals.credit {
        CreditStanding::Report {
            active_tradelines, ..
        } => {
            let passed = *active_tradelines <= config.max_active_tradelines;
            let relation = if passed { "within" } else { "exceeds" };
            (
                passed,
                format!(
                    "{active_tradelines} active tradelines {relation} maximum {}",
                    config.max_active_tradelines
                ),
            )
        }
        CreditStanding::Unavailable { .. } => {
            (false, "tradeline count not available".to_string())
        }
    }
}
