use super::report::{AccountStatus, HitStatus, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Label and bucket for one payment-history status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusEntry {
    pub label: String,
    pub severity: Severity,
}

/// Bureau-specific lookup data consumed by the normalizer.
///
/// Hit and payment codes are matched uppercased, account statuses lowercased
/// with whitespace collapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BureauTables {
    pub hit_codes: HashMap<String, HitStatus>,
    pub payment_statuses: HashMap<String, PaymentStatusEntry>,
    pub account_statuses: HashMap<String, AccountStatus>,
}

#[derive(Debug, thiserror::Error)]
pub enum BureauTablesError {
    #[error("failed to read bureau tables: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid bureau tables document: {0}")]
    Json(#[from] serde_json::Error),
}

impl BureauTables {
    pub fn standard() -> Self {
        let hit_codes = HIT_CODES
            .iter()
            .map(|(code, status)| (code.to_ascii_uppercase(), *status))
            .collect();
        let payment_statuses = PAYMENT_STATUSES
            .iter()
            .map(|(code, label, severity)| {
                (
                    code.to_ascii_uppercase(),
                    PaymentStatusEntry {
                        label: (*label).to_string(),
                        severity: *severity,
                    },
                )
            })
            .collect();
        let account_statuses = ACCOUNT_STATUSES
            .iter()
            .map(|(name, status)| (normalize_status_text(name), *status))
            .collect();

        Self {
            hit_codes,
            payment_statuses,
            account_statuses,
        }
    }

    /// Loads a JSON document with the same shape as the serialized tables.
    /// Keys are re-normalized so hand-edited files can use any casing.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BureauTablesError> {
        let raw: BureauTables = serde_json::from_reader(reader)?;
        Ok(Self {
            hit_codes: raw
                .hit_codes
                .into_iter()
                .map(|(code, status)| (code.trim().to_ascii_uppercase(), status))
                .collect(),
            payment_statuses: raw
                .payment_statuses
                .into_iter()
                .map(|(code, entry)| (code.trim().to_ascii_uppercase(), entry))
                .collect(),
            account_statuses: raw
                .account_statuses
                .into_iter()
                .map(|(name, status)| (normalize_status_text(&name), status))
                .collect(),
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BureauTablesError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn hit_status(&self, code: &str) -> HitStatus {
        self.hit_codes
            .get(&code.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or(HitStatus::Unknown)
    }

    pub fn payment_status(&self, code: &str) -> Option<&PaymentStatusEntry> {
        self.payment_statuses.get(&code.trim().to_ascii_uppercase())
    }

    pub fn account_status(&self, text: &str) -> AccountStatus {
        self.account_statuses
            .get(&normalize_status_text(text))
            .copied()
            .unwrap_or(AccountStatus::Unknown)
    }
}

impl Default for BureauTables {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize_status_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

const HIT_CODES: &[(&str, HitStatus)] = &[
    ("10", HitStatus::Hit),
    ("H", HitStatus::Hit),
    ("HIT", HitStatus::Hit),
    ("11", HitStatus::NoHit),
    ("N", HitStatus::NoHit),
    ("NH", HitStatus::NoHit),
    ("12", HitStatus::AgeCriteriaFailed),
    ("A", HitStatus::AgeCriteriaFailed),
    ("13", HitStatus::IdScrubFailed),
    ("I", HitStatus::IdScrubFailed),
    ("14", HitStatus::FileFrozen),
    ("F", HitStatus::FileFrozen),
    ("15", HitStatus::SystemError),
    ("99", HitStatus::SystemError),
    ("E", HitStatus::SystemError),
];

const PAYMENT_STATUSES: &[(&str, &str, Severity)] = &[
    ("000", "On time", Severity::Current),
    ("STD", "Standard", Severity::Current),
    ("NEW", "New account", Severity::Current),
    ("CLS", "Closed", Severity::Current),
    ("XXX", "Not reported", Severity::Current),
    ("*", "Not reported", Severity::Current),
    ("01+", "1-29 days past due", Severity::Dpd),
    ("030", "30 days past due", Severity::Dpd),
    ("30+", "30-59 days past due", Severity::Dpd),
    ("060", "60 days past due", Severity::Dpd),
    ("60+", "60-89 days past due", Severity::Dpd),
    ("SMA", "Special mention account", Severity::Dpd),
    ("090", "90 days past due", Severity::Severe),
    ("90+", "90-119 days past due", Severity::Severe),
    ("120", "120 days past due", Severity::Severe),
    ("120+", "120-179 days past due", Severity::Severe),
    ("180", "180 days past due", Severity::Severe),
    ("180+", "180+ days past due", Severity::Severe),
    ("360+", "360+ days past due", Severity::Severe),
    ("SUB", "Sub-standard", Severity::Severe),
    ("DBT", "Doubtful", Severity::Severe),
    ("LSS", "Loss", Severity::Writeoff),
    ("WOF", "Written off", Severity::Writeoff),
    ("WDF", "Wilful default", Severity::Writeoff),
    ("SET", "Settled", Severity::Writeoff),
    ("SUF", "Suit filed", Severity::Writeoff),
];

const ACCOUNT_STATUSES: &[(&str, AccountStatus)] = &[
    ("active", AccountStatus::Active),
    ("current", AccountStatus::Active),
    ("current account", AccountStatus::Active),
    ("open", AccountStatus::Active),
    ("standard", AccountStatus::Active),
    ("closed", AccountStatus::Closed),
    ("closed account", AccountStatus::Closed),
    ("paid", AccountStatus::Closed),
    ("account closed", AccountStatus::Closed),
    ("written off", AccountStatus::WrittenOff),
    ("written-off", AccountStatus::WrittenOff),
    ("write-off", AccountStatus::WrittenOff),
    ("wof", AccountStatus::WrittenOff),
    ("settled", AccountStatus::WrittenOff),
    ("post (wo) settled", AccountStatus::WrittenOff),
    ("suit filed", AccountStatus::WrittenOff),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn lookups_are_case_insensitive() {
        let tables = BureauTables::standard();
        assert_eq!(tables.hit_status(" h "), HitStatus::Hit);
        assert_eq!(tables.hit_status("42"), HitStatus::Unknown);
        assert_eq!(
            tables.payment_status("std").map(|entry| entry.severity),
            Some(Severity::Current)
        );
        assert_eq!(
            tables.account_status("Current  Account"),
            AccountStatus::Active
        );
        assert_eq!(tables.account_status("Dormant"), AccountStatus::Unknown);
    }

    #[test]
    fn tables_load_from_json_document() {
        let document = r#"{
            "hit_codes": { "y": "hit" },
            "payment_statuses": { "ok": { "label": "Fine", "severity": "current" } },
            "account_statuses": { "LIVE": "active" }
        }"#;
        let tables = BureauTables::from_reader(Cursor::new(document)).expect("tables parse");
        assert_eq!(tables.hit_status("Y"), HitStatus::Hit);
        assert_eq!(tables.hit_status("10"), HitStatus::Unknown);
        assert_eq!(
            tables.payment_status("OK").map(|entry| entry.label.as_str()),
            Some("Fine")
        );
        assert_eq!(tables.account_status("live"), AccountStatus::Active);
    }

    #[test]
    fn malformed_document_is_reported() {
        let error = BureauTables::from_reader(Cursor::new("{ not json")).expect_err("invalid");
        assert!(matches!(error, BureauTablesError::Json(_)));
    }
}
