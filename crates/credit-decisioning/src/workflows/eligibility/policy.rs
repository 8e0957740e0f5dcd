use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::PolicyRule;
use super::{CreditStanding, PolicyCheck};

/// Outcome surfaced to case management. A missing credit check is never
/// reported as `NotEligible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Eligible,
    NotEligible,
    CreditCheckUnavailable,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::Eligible => "eligible",
            AssessmentStatus::NotEligible => "not_eligible",
            AssessmentStatus::CreditCheckUnavailable => "credit_check_unavailable",
        }
    }
}

/// Every critical rule must pass; non-critical failures are left for review.
pub(crate) fn is_eligible(checks: &BTreeMap<PolicyRule, PolicyCheck>) -> bool {
    checks
        .values()
        .filter(|check| check.critical)
        .all(|check| check.passed)
}

pub(crate) fn decide_status(eligible: bool, credit: &CreditStanding) -> AssessmentStatus {
    match credit {
        CreditStanding::Unavailable { .. } => AssessmentStatus::CreditCheckUnavailable,
        CreditStanding::Report { .. } if eligible => AssessmentStatus::Eligible,
        CreditStanding::Report { .. } => AssessmentStatus::NotEligible,
    }
}

/// Failed critical rules first, then failed advisory rules, for review notes.
pub(crate) fn review_notes(checks: &BTreeMap<PolicyRule, PolicyCheck>) -> Vec<String> {
    let failed = |critical: bool| {
        checks
            .iter()
            .filter(move |(_, check)| !check.passed && check.critical == critical)
            .map(|(rule, check)| format!("{}: {}", rule.key(), check.details))
    };
    failed(true).chain(failed(false)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(passed: bool, critical: bool) -> PolicyCheck {
        PolicyCheck {
            passed,
            details: String::new(),
            critical,
        }
    }

    #[test]
    fn advisory_failures_do_not_block() {
        let checks = BTreeMap::from([
            (PolicyRule::Foir, check(true, true)),
            (PolicyRule::Age, check(false, false)),
        ]);
        assert!(is_eligible(&checks));

        let checks = BTreeMap::from([
            (PolicyRule::Foir, check(false, true)),
            (PolicyRule::Age, check(true, false)),
        ]);
        assert!(!is_eligible(&checks));
    }

    #[test]
    fn unavailable_credit_is_its_own_status() {
        let credit = CreditStanding::Unavailable {
            reason: "container not found".to_string(),
        };
        assert_eq!(
            decide_status(true, &credit),
            AssessmentStatus::CreditCheckUnavailable
        );
        assert_eq!(
            decide_status(false, &credit),
            AssessmentStatus::CreditCheckUnavailable
        );
    }

    #[test]
    fn review_notes_list_critical_failures_first() {
        let mut failing_age = check(false, false);
        failing_age.details = "DOB not available".to_string();
        let mut failing_foir = check(false, true);
        failing_foir.details = "FOIR 60.00% exceeds limit 50.00%".to_string();
        let checks = BTreeMap::from([
            (PolicyRule::Age, failing_age),
            (PolicyRule::Foir, failing_foir),
        ]);
        assert_eq!(
            review_notes(&checks),
            vec![
                "foir: FOIR 60.00% exceeds limit 50.00%".to_string(),
                "age: DOB not available".to_string(),
            ]
        );
    }
}
