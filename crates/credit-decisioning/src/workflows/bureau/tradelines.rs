use super::fields::{date, first_present, first_text, flag, money, text_or};
use super::report::{
    AccountStatus, PaymentHistoryEntry, Severity, TradeLine, MAX_HISTORY_PERIODS,
};
use super::tables::BureauTables;
use chrono::{Months, NaiveDate};
use serde_json::Value;

const INSTITUTION_KEYS: &[&str] = &[
    "Institution",
    "InstitutionName",
    "SubscriberName",
    "MemberShortName",
];
const HISTORY_KEYS: &[&str] = &["History48Months", "PaymentHistory"];
const STATUS_CODE_WIDTH: usize = 3;

pub(crate) fn parse_tradeline(
    value: &Value,
    tables: &BureauTables,
    report_date: Option<NaiveDate>,
) -> Result<TradeLine, String> {
    if !value.is_object() {
        return Err("tradeline entry is not an object".to_string());
    }

    let status = resolve_status(
        first_text(value, &["AccountStatus", "Status"]).as_deref(),
        flag(value, "Open"),
        tables,
    );

    Ok(TradeLine {
        institution: first_text(value, INSTITUTION_KEYS).unwrap_or_else(|| "Unknown".to_string()),
        account_type: text_or(value, "AccountType", "Unknown"),
        ownership_type: text_or(value, "OwnershipType", "Unknown"),
        account_number: text_or(value, "AccountNumber", ""),
        status,
        sanction_amount: money(value, &["SanctionAmount"])?,
        current_balance: money(value, &["Balance", "CurrentBalance"])?,
        past_due_amount: money(value, &["PastDueAmount"])?,
        emi_amount: money(value, &["InstallmentAmount", "EmiAmount"])?,
        high_credit: money(value, &["HighCredit"])?,
        credit_limit: money(value, &["CreditLimit"])?,
        date_opened: date(value, &["DateOpened"]),
        date_reported: date(value, &["DateReported"]),
        payment_history: payment_history(first_present(value, HISTORY_KEYS), tables, report_date),
    })
}

/// Combines the explicit status text with the open flag. A closed flag always
/// wins; an open flag only fills in an unrecognized status.
pub(crate) fn resolve_status(
    explicit: Option<&str>,
    open: Option<bool>,
    tables: &BureauTables,
) -> AccountStatus {
    let explicit = explicit
        .map(|text| tables.account_status(text))
        .unwrap_or(AccountStatus::Unknown);

    match (explicit, open) {
        (_, Some(false)) => AccountStatus::Closed,
        (AccountStatus::Unknown, Some(true)) => AccountStatus::Active,
        (status, _) => status,
    }
}

fn payment_history(
    value: Option<&Value>,
    tables: &BureauTables,
    report_date: Option<NaiveDate>,
) -> Vec<PaymentHistoryEntry> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .take(MAX_HISTORY_PERIODS)
            .enumerate()
            .map(|(index, item)| {
                let (period, code) = match item {
                    Value::Object(_) => (
                        first_text(item, &["key", "Period", "Month"]),
                        first_text(item, &["PaymentStatus", "Status"]).unwrap_or_default(),
                    ),
                    Value::String(code) => (None, code.trim().to_string()),
                    other => (None, other.to_string()),
                };
                let period = period.unwrap_or_else(|| period_label(report_date, index));
                classify(period, code, tables)
            })
            .collect(),
        Some(Value::String(flat)) => {
            let symbols: Vec<char> = flat.chars().filter(|c| !c.is_whitespace()).collect();
            symbols
                .chunks(STATUS_CODE_WIDTH)
                .filter(|chunk| chunk.len() == STATUS_CODE_WIDTH)
                .take(MAX_HISTORY_PERIODS)
                .enumerate()
                .map(|(index, chunk)| {
                    classify(
                        period_label(report_date, index),
                        chunk.iter().collect(),
                        tables,
                    )
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

fn classify(period_label: String, code: String, tables: &BureauTables) -> PaymentHistoryEntry {
    let (label, severity) = match tables.payment_status(&code) {
        Some(entry) => (entry.label.clone(), entry.severity),
        None => (code.clone(), Severity::Current),
    };

    PaymentHistoryEntry {
        period_label,
        raw_status_code: code,
        label,
        severity,
    }
}

/// `MM-YY` counted back from the report month, or a positional label when the
/// report date is unknown.
fn period_label(report_date: Option<NaiveDate>, index: usize) -> String {
    report_date
        .and_then(|date| date.checked_sub_months(Months::new(index as u32)))
        .map(|date| date.format("%m-%y").to_string())
        .unwrap_or_else(|| format!("M{}", index + 1))
}
