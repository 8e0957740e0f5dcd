//! FOIR-based affordability and policy evaluation.
//!
//! [`EligibilityEngine::evaluate`] is a pure function of its inputs: the
//! evaluation date is part of [`EligibilityInputs`], so the same inputs always
//! produce the same assessment.

mod config;
pub mod formulas;
mod policy;
mod rules;

pub use config::{EligibilityConfig, EligibilityConfigError};
pub use policy::AssessmentStatus;
pub use rules::PolicyRule;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bureau::{CreditReport, HitStatus};
use super::income::IncomeSummary;
use rules::RuleSignals;

/// What the credit rules know about the applicant's bureau standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CreditStanding {
    Report {
        hit_status: HitStatus,
        score: u16,
        active_tradelines: u32,
    },
    /// Fetch failed, timed out, or the payload could not be parsed.
    Unavailable { reason: String },
}

impl CreditStanding {
    pub fn from_report(report: &CreditReport) -> Self {
        CreditStanding::Report {
            hit_status: report.hit_status,
            score: report.usable_score().unwrap_or(0),
            active_tradelines: report.active_accounts(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        CreditStanding::Unavailable {
            reason: reason.into(),
        }
    }
}

/// New obligation under assessment, either as a repayment or a principal to
/// convert into one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposedObligation {
    Emi(f64),
    Principal(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityInputs {
    pub evaluated_on: NaiveDate,
    pub date_of_birth: Option<NaiveDate>,
    pub employment_start: Option<NaiveDate>,
    pub gross_income: f64,
    pub net_income: f64,
    pub total_deductions: f64,
    pub existing_emi: f64,
    pub proposed: Option<ProposedObligation>,
    pub tenure_days: Option<u32>,
    pub daily_rate_pct: Option<f64>,
    pub max_foir_pct: Option<f64>,
    pub credit: CreditStanding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCheck {
    pub passed: bool,
    pub details: String,
    pub critical: bool,
}

/// Inputs as they were when the assessment was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInputs {
    pub gross_income: f64,
    pub net_income: f64,
    pub total_deductions: f64,
    pub existing_emi: f64,
    pub proposed_emi: f64,
    pub max_allowed_foir_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityAssessment {
    pub status: AssessmentStatus,
    pub is_eligible: bool,
    pub inputs: AssessmentInputs,
    pub foir_pct: f64,
    pub max_repayment_capacity: f64,
    pub eligible_loan_amount: u64,
    pub recommended_tenure_days: u32,
    pub recommended_daily_rate_pct: f64,
    pub policy_checks: BTreeMap<PolicyRule, PolicyCheck>,
    pub review_notes: Vec<String>,
    pub credit: CreditStanding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_summary: Option<IncomeSummary>,
    #[serde(default)]
    pub validation_issues: Vec<String>,
    pub evaluated_on: NaiveDate,
}

/// Stateless evaluator that applies the product policy to a set of inputs.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    config: EligibilityConfig,
}

impl EligibilityEngine {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn evaluate(&self, inputs: &EligibilityInputs) -> EligibilityAssessment {
        let tenure_days = inputs.tenure_days.unwrap_or(self.config.default_tenure_days);
        let daily_rate_pct = inputs
            .daily_rate_pct
            .unwrap_or(self.config.default_daily_rate_pct);
        let max_foir_pct = inputs.max_foir_pct.unwrap_or(self.config.max_foir_pct);

        let proposed_emi = match inputs.proposed {
            Some(ProposedObligation::Emi(emi)) => emi,
            Some(ProposedObligation::Principal(principal)) => {
                formulas::proposed_emi(principal, daily_rate_pct, tenure_days)
            }
            None => 0.0,
        };

        let foir_pct = formulas::foir_pct(inputs.existing_emi, proposed_emi, inputs.net_income);
        let capacity =
            formulas::max_repayment_capacity(inputs.net_income, max_foir_pct, inputs.existing_emi);
        let eligible_loan_amount =
            formulas::eligible_loan_amount(capacity, daily_rate_pct, tenure_days);

        let signals = RuleSignals {
            evaluated_on: inputs.evaluated_on,
            date_of_birth: inputs.date_of_birth,
            employment_start: inputs.employment_start,
            net_income: inputs.net_income,
            foir_pct,
            max_foir_pct,
            credit: &inputs.credit,
        };
        let policy_checks: BTreeMap<PolicyRule, PolicyCheck> = PolicyRule::ALL
            .into_iter()
            .map(|rule| (rule, rules::evaluate_rule(rule, &signals, &self.config)))
            .collect();

        let is_eligible = policy::is_eligible(&policy_checks);
        let status = policy::decide_status(is_eligible, &inputs.credit);

        EligibilityAssessment {
            status,
            is_eligible,
            inputs: AssessmentInputs {
                gross_income: inputs.gross_income,
                net_income: inputs.net_income,
                total_deductions: inputs.total_deductions,
                existing_emi: inputs.existing_emi,
                proposed_emi,
                max_allowed_foir_pct: max_foir_pct,
            },
            foir_pct,
            max_repayment_capacity: formulas::round2(capacity),
            eligible_loan_amount,
            recommended_tenure_days: tenure_days,
            recommended_daily_rate_pct: daily_rate_pct,
            review_notes: policy::review_notes(&policy_checks),
            policy_checks,
            credit: inputs.credit.clone(),
            income_summary: None,
            validation_issues: Vec::new(),
            evaluated_on: inputs.evaluated_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn on(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn inputs() -> EligibilityInputs {
        EligibilityInputs {
            evaluated_on: on(2024, 6, 1),
            date_of_birth: Some(on(1990, 3, 10)),
            employment_start: Some(on(2021, 4, 1)),
            gross_income: 120_000.0,
            net_income: 100_000.0,
            total_deductions: 20_000.0,
            existing_emi: 10_000.0,
            proposed: Some(ProposedObligation::Emi(15_000.0)),
            tenure_days: Some(30),
            daily_rate_pct: Some(1.0),
            max_foir_pct: Some(50.0),
            credit: CreditStanding::Report {
                hit_status: HitStatus::Hit,
                score: 742,
                active_tradelines: 3,
            },
        }
    }

    #[test]
    fn reference_case_is_eligible() {
        let assessment = EligibilityEngine::default().evaluate(&inputs());
        assert_eq!(assessment.foir_pct, 25.00);
        assert_eq!(assessment.max_repayment_capacity, 40_000.0);
        assert_eq!(assessment.eligible_loan_amount, 30_769);
        assert_eq!(assessment.recommended_tenure_days, 30);
        assert!(assessment.is_eligible);
        assert_eq!(assessment.status, AssessmentStatus::Eligible);
        assert_eq!(assessment.policy_checks.len(), 6);
        assert!(assessment.review_notes.is_empty());
    }

    #[test]
    fn principal_is_converted_to_total_repayment() {
        let mut request = inputs();
        request.proposed = Some(ProposedObligation::Principal(20_000.0));
        let assessment = EligibilityEngine::default().evaluate(&request);
        assert_eq!(assessment.inputs.proposed_emi, 26_000.0);
        assert_eq!(assessment.foir_pct, 36.00);
    }

    #[test]
    fn missing_dob_is_advisory_under_default_policy() {
        let mut request = inputs();
        request.date_of_birth = None;
        let assessment = EligibilityEngine::default().evaluate(&request);
        let age = &assessment.policy_checks[&PolicyRule::Age];
        assert!(!age.passed);
        assert!(age.details.contains("not available"));
        assert!(assessment.is_eligible);
        assert_eq!(assessment.review_notes, vec!["age: DOB not available".to_string()]);
    }

    #[test]
    fn critical_age_rule_blocks_when_configured() {
        let mut config = EligibilityConfig::default();
        config.critical_rules.insert(PolicyRule::Age);
        let mut request = inputs();
        request.date_of_birth = None;
        let assessment = EligibilityEngine::new(config).evaluate(&request);
        assert!(!assessment.is_eligible);
        assert_eq!(assessment.status, AssessmentStatus::NotEligible);
    }

    #[test]
    fn high_foir_is_not_eligible() {
        let mut request = inputs();
        request.proposed = Some(ProposedObligation::Emi(45_000.0));
        let assessment = EligibilityEngine::default().evaluate(&request);
        assert_eq!(assessment.foir_pct, 55.00);
        assert!(!assessment.policy_checks[&PolicyRule::Foir].passed);
        assert_eq!(assessment.status, AssessmentStatus::NotEligible);
    }

    #[test]
    fn unavailable_credit_check_is_distinct_from_not_eligible() {
        let mut request = inputs();
        request.credit = CreditStanding::unavailable("bureau did not respond within 30s");
        let assessment = EligibilityEngine::default().evaluate(&request);
        assert!(!assessment.is_eligible);
        assert_eq!(assessment.status, AssessmentStatus::CreditCheckUnavailable);
        assert_eq!(assessment.eligible_loan_amount, 30_769);
    }

    #[test]
    fn zero_net_income_gives_zero_foir_and_fails_income() {
        let mut request = inputs();
        request.net_income = 0.0;
        let assessment = EligibilityEngine::default().evaluate(&request);
        assert_eq!(assessment.foir_pct, 0.0);
        assert_eq!(assessment.eligible_loan_amount, 0);
        assert!(!assessment.policy_checks[&PolicyRule::MinimumIncome].passed);
        assert!(assessment.policy_checks[&PolicyRule::Foir].passed);
        assert!(!assessment.is_eligible);
    }

    #[test]
    fn zero_net_income_passes_foir_when_income_rule_is_advisory() {
        let config = EligibilityConfig {
            critical_rules: std::collections::BTreeSet::from([
                PolicyRule::CreditScore,
                PolicyRule::Foir,
                PolicyRule::Age,
            ]),
            ..EligibilityConfig::default()
        };
        let mut request = inputs();
        request.net_income = 0.0;
        request.proposed = Some(ProposedObligation::Emi(15_000.0));

        let assessment = EligibilityEngine::new(config).evaluate(&request);
        let check = &assessment.policy_checks[&PolicyRule::Foir];
        assert_eq!(assessment.foir_pct, 0.0);
        assert!(check.passed);
        assert!(check.details.contains("defaulted to 0"));
    }

    #[test]
    fn defaults_fill_missing_product_terms() {
        let mut request = inputs();
        request.tenure_days = None;
        request.daily_rate_pct = None;
        request.max_foir_pct = None;
        let assessment = EligibilityEngine::default().evaluate(&request);
        assert_eq!(assessment.recommended_tenure_days, 30);
        assert_eq!(assessment.recommended_daily_rate_pct, 1.0);
        assert_eq!(assessment.inputs.max_allowed_foir_pct, 50.0);
    }

    #[test]
    fn assessment_serializes_rule_keys() {
        let assessment = EligibilityEngine::default().evaluate(&inputs());
        let value = serde_json::to_value(&assessment).expect("serializes");
        assert_eq!(value["status"], "eligible");
        assert_eq!(value["policy_checks"]["credit_score"]["passed"], true);
        assert_eq!(value["policy_checks"]["minimum_income"]["critical"], true);
        assert_eq!(value["credit"]["state"], "report");
    }

    proptest! {
        #[test]
        fn evaluation_is_idempotent_and_never_negative(
            net in 0u32..500_000,
            existing in 0u32..200_000,
            proposed in 0u32..200_000,
            tenure in 1u32..120,
            rate_bp in 0u32..300,
            score in prop::option::of(300u16..=900),
        ) {
            let mut request = inputs();
            request.net_income = f64::from(net);
            request.existing_emi = f64::from(existing);
            request.proposed = Some(ProposedObligation::Emi(f64::from(proposed)));
            request.tenure_days = Some(tenure);
            request.daily_rate_pct = Some(f64::from(rate_bp) / 100.0);
            request.credit = match score {
                Some(score) => CreditStanding::Report { hit_status: HitStatus::Hit, score, active_tradelines: 1 },
                None => CreditStanding::unavailable("no report"),
            };

            let engine = EligibilityEngine::default();
            let first = engine.evaluate(&request);
            let second = engine.evaluate(&request);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.foir_pct >= 0.0);
            prop_assert_eq!(
                first.is_eligible,
                first.policy_checks.values().filter(|c| c.critical).all(|c| c.passed)
            );
            if score.is_none() {
                prop_assert_eq!(first.status, AssessmentStatus::CreditCheckUnavailable);
            }
        }
    }
}
