use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::rules::PolicyRule;

/// Product policy thresholds. `Default` is the standard short-tenure product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub min_age_years: u32,
    pub max_age_years: u32,
    pub min_net_income: f64,
    pub min_employment_months: u32,
    pub min_credit_score: u16,
    pub max_foir_pct: f64,
    pub max_active_tradelines: u32,
    pub default_tenure_days: u32,
    pub default_daily_rate_pct: f64,
    /// Rules whose failure alone denies eligibility.
    pub critical_rules: BTreeSet<PolicyRule>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_age_years: 21,
            max_age_years: 58,
            min_net_income: 25_000.0,
            min_employment_months: 12,
            min_credit_score: 650,
            max_foir_pct: 50.0,
            max_active_tradelines: 6,
            default_tenure_days: 30,
            default_daily_rate_pct: 1.0,
            critical_rules: BTreeSet::from([
                PolicyRule::MinimumIncome,
                PolicyRule::CreditScore,
                PolicyRule::Foir,
            ]),
        }
    }
}

impl EligibilityConfig {
    pub fn is_critical(&self, rule: PolicyRule) -> bool {
        self.critical_rules.contains(&rule)
    }

    /// Reads a policy override from JSON. Missing fields keep their defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EligibilityConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EligibilityConfigError> {
        if self.min_age_years > self.max_age_years {
            return Err(EligibilityConfigError::Invalid(format!(
                "age band {}-{} is empty",
                self.min_age_years, self.max_age_years
            )));
        }
        if !(0.0..=100.0).contains(&self.max_foir_pct) {
            return Err(EligibilityConfigError::Invalid(format!(
                "max FOIR {} outside 0-100",
                self.max_foir_pct
            )));
        }
        if self.default_daily_rate_pct < 0.0 {
            return Err(EligibilityConfigError::Invalid(
                "daily rate cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EligibilityConfigError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse policy file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid policy: {0}")]
    Invalid(String),
}
