//! Bureau payload normalization.
//!
//! Payloads arrive in one of two container layouts. [`envelope::detect`] locates
//! the report blocks once; every parser below works on the located blocks and
//! never on the raw layout.

mod enquiries;
mod envelope;
mod fields;
pub mod gateway;
mod personal;
mod report;
mod summary;
mod tables;
mod tradelines;

pub use gateway::{fetch_with_budget, BureauFetchError, BureauGateway, BureauRequest};
pub use report::{
    AccountStatus, AccountsSummary, CreditReport, Enquiry, HitStatus, PaymentHistoryEntry,
    PersonalInfo, SchemaVariant, Severity, TradeLine, MAX_ACCOUNTS, MAX_HISTORY_PERIODS,
};
pub use tables::{BureauTables, BureauTablesError, PaymentStatusEntry};

use chrono::{Local, NaiveDate};
use envelope::ReportEnvelope;
use fields::{amount, first_text, list, text, Amount};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

const MIN_SCORE: f64 = 300.0;
const MAX_SCORE: f64 = 900.0;

/// Fatal normalization failure. Per-record problems are reported through
/// [`NormalizedReport::skipped`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("container not found")]
    ContainerNotFound,
}

/// Kind of record dropped during best-effort parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Tradeline,
    Enquiry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    pub index: usize,
    pub reason: String,
}

/// Normalized report plus the records that could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReport {
    pub report: CreditReport,
    pub skipped: Vec<SkippedRecord>,
}

/// Reduces raw bureau payloads to [`CreditReport`]s using injected lookup tables.
#[derive(Debug, Clone, Default)]
pub struct BureauResponseNormalizer {
    tables: BureauTables,
}

impl BureauResponseNormalizer {
    pub fn new(tables: BureauTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &BureauTables {
        &self.tables
    }

    /// Normalizes with enquiry windows anchored to today's local date.
    pub fn normalize(&self, payload: &Value) -> Result<NormalizedReport, ParseError> {
        self.normalize_on(payload, Local::now().date_naive())
    }

    /// Normalizes with enquiry windows anchored to `today`.
    pub fn normalize_on(
        &self,
        payload: &Value,
        today: NaiveDate,
    ) -> Result<NormalizedReport, ParseError> {
        let envelope = envelope::detect(payload)?;
        let mut skipped = Vec::new();

        let header = envelope.header.unwrap_or(&fields::NULL);
        let report_date = fields::date(header, &["Date", "ReportDate"]);
        let hit_status = first_text(header, &["HitCode", "Hit"])
            .map(|code| self.tables.hit_status(&code))
            .unwrap_or(HitStatus::Unknown);

        let accounts = self.parse_accounts(&envelope, report_date, &mut skipped);
        let recorded_enquiries = parse_enquiries(&envelope, &mut skipped);

        let (score, score_type, score_version) = match read_score(&envelope) {
            Some(found) if hit_status == HitStatus::Hit => found,
            Some(_) | None => (0, String::new(), String::new()),
        };

        let report = CreditReport {
            source_variant: envelope.variant,
            report_date,
            report_order_number: first_text(header, &["ReportOrderNO", "ReportOrderNumber"]),
            hit_status,
            score,
            score_type,
            score_version,
            summary: summary::summarize(envelope.report, &accounts),
            enquiries_last_30_days: enquiries::count_within(&recorded_enquiries, today, 30),
            enquiries_last_90_days: enquiries::count_within(&recorded_enquiries, today, 90),
            personal_info: personal::parse_personal_info(envelope.report),
            accounts,
            enquiries: recorded_enquiries,
        };

        Ok(NormalizedReport { report, skipped })
    }

    fn parse_accounts(
        &self,
        envelope: &ReportEnvelope<'_>,
        report_date: Option<NaiveDate>,
        skipped: &mut Vec<SkippedRecord>,
    ) -> Vec<TradeLine> {
        let entries = list(
            envelope.report,
            &["RetailAccountDetails", "AccountDetails"],
        );

        let mut accounts = Vec::with_capacity(entries.len().min(MAX_ACCOUNTS));
        for (index, entry) in entries.into_iter().take(MAX_ACCOUNTS).enumerate() {
            match tradelines::parse_tradeline(entry, &self.tables, report_date) {
                Ok(tradeline) => accounts.push(tradeline),
                Err(reason) => {
                    warn!(index, %reason, "skipping unreadable tradeline");
                    skipped.push(SkippedRecord {
                        kind: RecordKind::Tradeline,
                        index,
                        reason,
                    });
                }
            }
        }
        accounts
    }
}

fn parse_enquiries(envelope: &ReportEnvelope<'_>, skipped: &mut Vec<SkippedRecord>) -> Vec<Enquiry> {
    let mut parsed = Vec::new();
    for (index, entry) in list(envelope.report, &["Enquiries", "Enquiry"])
        .into_iter()
        .enumerate()
    {
        match enquiries::parse_enquiry(entry) {
            Ok(enquiry) => parsed.push(enquiry),
            Err(reason) => {
                warn!(index, %reason, "skipping unreadable enquiry");
                skipped.push(SkippedRecord {
                    kind: RecordKind::Enquiry,
                    index,
                    reason,
                });
            }
        }
    }
    parsed
}

/// First in-range score across the envelope's score blocks, in priority order.
fn read_score(envelope: &ReportEnvelope<'_>) -> Option<(u16, String, String)> {
    envelope
        .score_blocks()
        .into_iter()
        .flatten()
        .flat_map(|block| match block {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            object @ Value::Object(_) => vec![object],
            _ => Vec::new(),
        })
        .find_map(|item| {
            let value = match amount(item, "Value") {
                Amount::Present(value) => value,
                Amount::Absent | Amount::Invalid => match amount(item, "Score") {
                    Amount::Present(value) => value,
                    Amount::Absent | Amount::Invalid => return None,
                },
            };
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                warn!(value, "bureau score outside 300-900, trying next score block");
                return None;
            }
            Some((
                value.round() as u16,
                text(item, "Type").map(|s| s.into_owned()).unwrap_or_default(),
                text(item, "Version").map(|s| s.into_owned()).unwrap_or_default(),
            ))
        })
}
