use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::address::AddressStateResolver;
use crate::workflows::bureau::{BureauRequest, CreditReport, NormalizedReport, SkippedRecord};
use crate::workflows::eligibility::CreditStanding;
use crate::workflows::income::IncomeEvidence;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_TENURE_DAYS: u32 = 365;
const MAX_DAILY_RATE_PCT: f64 = 5.0;

/// Identifier wrapper for loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Applicant identity supplied by case management for a bureau pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSnapshot {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: String,
    pub pan: String,
    #[serde(default)]
    pub aadhaar: Option<String>,
    pub mobile: String,
    pub address: AddressSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub line: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl ApplicantSnapshot {
    /// Builds the bureau request, resolving the state code from the free-text
    /// address. Identity fields must be well formed since the bureau matches on them.
    pub fn bureau_request(
        &self,
        resolver: &AddressStateResolver,
    ) -> Result<BureauRequest, ValidationError> {
        let date_of_birth = parse_date("date_of_birth", &self.date_of_birth)?;
        let pan = self.pan.trim().to_ascii_uppercase();
        if !is_valid_pan(&pan) {
            return Err(ValidationError::InvalidIdentifier {
                field: "pan",
                value: self.pan.clone(),
            });
        }
        let mobile: String = self.mobile.chars().filter(char::is_ascii_digit).collect();
        if mobile.len() < 10 {
            return Err(ValidationError::InvalidIdentifier {
                field: "mobile",
                value: self.mobile.clone(),
            });
        }

        let state_code = resolver.resolve(
            self.address.state.as_deref(),
            self.address.postal_code.as_deref(),
        );

        Ok(BureauRequest {
            first_name: self.first_name.trim().to_string(),
            middle_name: self
                .middle_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            last_name: self.last_name.trim().to_string(),
            date_of_birth: date_of_birth.format(DATE_FORMAT).to_string(),
            pan,
            aadhaar: self.aadhaar.clone(),
            mobile: mobile[mobile.len() - 10..].to_string(),
            address_line: self.address.line.trim().to_string(),
            state_code,
            postal_code: self
                .address
                .postal_code
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

fn is_valid_pan(pan: &str) -> bool {
    let bytes = pan.as_bytes();
    bytes.len() == 10
        && bytes[..5].iter().all(u8::is_ascii_uppercase)
        && bytes[5..9].iter().all(u8::is_ascii_digit)
        && bytes[9].is_ascii_uppercase()
}

/// Extracted and manually keyed income records, kept apart so the aggregator
/// can order them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeEvidenceBundle {
    #[serde(default)]
    pub extracted: Vec<IncomeEvidence>,
    #[serde(default)]
    pub manual: Vec<IncomeEvidence>,
}

/// Underwriting inputs for one eligibility run. Dates are raw strings so that
/// malformed values degrade to failing checks rather than rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentRequest {
    pub evaluated_on: Option<NaiveDate>,
    pub date_of_birth: Option<String>,
    pub employment_start: Option<String>,
    pub gross_income: Option<f64>,
    pub net_income: Option<f64>,
    pub existing_emi: Option<f64>,
    pub proposed_emi: Option<f64>,
    pub requested_principal: Option<f64>,
    pub tenure_days: Option<u32>,
    pub daily_rate_pct: Option<f64>,
    pub income_evidence: IncomeEvidenceBundle,
}

/// Request fields after validation. Anything invalid is dropped and reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRequest {
    pub date_of_birth: Option<NaiveDate>,
    pub employment_start: Option<NaiveDate>,
    pub gross_income: Option<f64>,
    pub net_income: Option<f64>,
    pub existing_emi: Option<f64>,
    pub proposed_emi: Option<f64>,
    pub requested_principal: Option<f64>,
    pub tenure_days: Option<u32>,
    pub daily_rate_pct: Option<f64>,
    pub issues: Vec<ValidationError>,
}

impl AssessmentRequest {
    pub fn validate(&self) -> ValidatedRequest {
        let mut issues = Vec::new();
        let mut keep = |result: Result<Option<f64>, ValidationError>| match result {
            Ok(value) => value,
            Err(issue) => {
                issues.push(issue);
                None
            }
        };

        let gross_income = keep(amount("gross_income", self.gross_income));
        let net_income = keep(amount("net_income", self.net_income));
        let existing_emi = keep(amount("existing_emi", self.existing_emi));
        let proposed_emi = keep(amount("proposed_emi", self.proposed_emi));
        let requested_principal = keep(amount("requested_principal", self.requested_principal));
        let daily_rate_pct = keep(amount("daily_rate_pct", self.daily_rate_pct).and_then(
            |rate| match rate {
                Some(rate) if rate > MAX_DAILY_RATE_PCT => Err(ValidationError::OutOfRange {
                    field: "daily_rate_pct",
                    detail: format!("{rate} exceeds {MAX_DAILY_RATE_PCT}"),
                }),
                other => Ok(other),
            },
        ));

        let tenure_days = match self.tenure_days {
            Some(days) if days == 0 || days > MAX_TENURE_DAYS => {
                issues.push(ValidationError::OutOfRange {
                    field: "tenure_days",
                    detail: format!("{days} not within 1-{MAX_TENURE_DAYS}"),
                });
                None
            }
            other => other,
        };

        let mut date = |field: &'static str, raw: &Option<String>| {
            let raw = raw.as_deref().map(str::trim).filter(|raw| !raw.is_empty())?;
            match parse_date(field, raw) {
                Ok(parsed) => Some(parsed),
                Err(issue) => {
                    issues.push(issue);
                    None
                }
            }
        };
        let date_of_birth = date("date_of_birth", &self.date_of_birth);
        let employment_start = date("employment_start", &self.employment_start);

        ValidatedRequest {
            date_of_birth,
            employment_start,
            gross_income,
            net_income,
            existing_emi,
            proposed_emi,
            requested_principal,
            tenure_days,
            daily_rate_pct,
            issues,
        }
    }
}

fn amount(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(ValidationError::InvalidAmount { field, value })
        }
        other => Ok(other),
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

/// Malformed or out-of-range applicant input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is not a valid YYYY-MM-DD date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
    #[error("{field} must be a non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("{field} out of range: {detail}")]
    OutOfRange { field: &'static str, detail: String },
    #[error("{field} is malformed: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },
}

/// Stored outcome of the latest bureau check for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CreditCheck {
    Completed {
        report: CreditReport,
        skipped: Vec<SkippedRecord>,
    },
    Unavailable {
        reason: String,
    },
}

impl CreditCheck {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CreditCheck::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn report(&self) -> Option<&CreditReport> {
        match self {
            CreditCheck::Completed { report, .. } => Some(report),
            CreditCheck::Unavailable { .. } => None,
        }
    }

    pub fn standing(&self) -> CreditStanding {
        match self {
            CreditCheck::Completed { report, .. } => CreditStanding::from_report(report),
            CreditCheck::Unavailable { reason } => CreditStanding::unavailable(reason.clone()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CreditCheck::Completed { .. } => "completed",
            CreditCheck::Unavailable { .. } => "unavailable",
        }
    }
}

impl From<NormalizedReport> for CreditCheck {
    fn from(normalized: NormalizedReport) -> Self {
        CreditCheck::Completed {
            report: normalized.report,
            skipped: normalized.skipped,
        }
    }
}
