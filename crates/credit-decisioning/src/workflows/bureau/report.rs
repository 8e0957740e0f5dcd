use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of tradelines kept on a normalized report.
pub const MAX_ACCOUNTS: usize = 15;
/// Maximum number of payment-history periods kept per tradeline.
pub const MAX_HISTORY_PERIODS: usize = 12;

/// Payload layout the report was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    Current,
    Legacy,
}

/// Whether the bureau found a file for the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitStatus {
    Hit,
    NoHit,
    AgeCriteriaFailed,
    IdScrubFailed,
    FileFrozen,
    SystemError,
    Unknown,
}

impl HitStatus {
    pub const fn label(self) -> &'static str {
        match self {
            HitStatus::Hit => "hit",
            HitStatus::NoHit => "no_hit",
            HitStatus::AgeCriteriaFailed => "age_criteria_failed",
            HitStatus::IdScrubFailed => "id_scrub_failed",
            HitStatus::FileFrozen => "file_frozen",
            HitStatus::SystemError => "system_error",
            HitStatus::Unknown => "unknown",
        }
    }
}

/// Canonical credit report produced from any supported payload variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditReport {
    pub source_variant: SchemaVariant,
    pub report_date: Option<NaiveDate>,
    pub report_order_number: Option<String>,
    pub hit_status: HitStatus,
    pub score: u16,
    pub score_type: String,
    pub score_version: String,
    pub accounts: Vec<TradeLine>,
    pub summary: AccountsSummary,
    pub enquiries: Vec<Enquiry>,
    pub enquiries_last_30_days: u32,
    pub enquiries_last_90_days: u32,
    pub personal_info: PersonalInfo,
}

impl CreditReport {
    pub fn active_accounts(&self) -> u32 {
        self.summary.active_accounts
    }

    /// The score if the bureau returned a usable one.
    pub fn usable_score(&self) -> Option<u16> {
        (self.hit_status == HitStatus::Hit && self.score > 0).then_some(self.score)
    }
}

/// Lifecycle state of a tradeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Closed,
    WrittenOff,
    Unknown,
}

/// A single credit account reported by the bureau.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLine {
    pub institution: String,
    pub account_type: String,
    pub ownership_type: String,
    pub account_number: String,
    pub status: AccountStatus,
    pub sanction_amount: f64,
    pub current_balance: f64,
    pub past_due_amount: f64,
    pub emi_amount: f64,
    pub high_credit: f64,
    pub credit_limit: f64,
    pub date_opened: Option<NaiveDate>,
    pub date_reported: Option<NaiveDate>,
    pub payment_history: Vec<PaymentHistoryEntry>,
}

impl TradeLine {
    pub fn worst_severity(&self) -> Option<Severity> {
        self.payment_history.iter().map(|entry| entry.severity).max()
    }
}

/// Delinquency bucket for one payment-history period, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Current,
    Dpd,
    Severe,
    Writeoff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub period_label: String,
    pub raw_status_code: String,
    pub label: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enquiry {
    pub date: NaiveDate,
    pub institution: String,
    pub purpose: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub pan: String,
    pub gender: String,
    pub addresses: Vec<String>,
    pub phones: Vec<String>,
}

/// Portfolio aggregates, bureau-reported where available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountsSummary {
    pub total_accounts: u32,
    pub active_accounts: u32,
    pub total_balance: f64,
    pub total_past_due: f64,
    pub total_sanctioned: f64,
    pub total_credit_limit: f64,
    pub total_monthly_payment: f64,
}
