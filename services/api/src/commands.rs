use crate::infra::{load_components, InMemoryAssessmentRepository, InMemoryCaseNotifier};
use chrono::{Local, NaiveDate};
use clap::Args;
use credit_decisioning::error::AppError;
use credit_decisioning::workflows::address::AddressStateResolver;
use credit_decisioning::workflows::applications::{
    ApplicationId, AssessmentRecord, AssessmentRequest, CreditCheck, LoanDecisioningService,
};
use credit_decisioning::workflows::bureau::{
    BureauFetchError, BureauGateway, BureauRequest, NormalizedReport,
};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct NormalizeArgs {
    /// Raw bureau response (JSON)
    pub(crate) payload: PathBuf,
    /// Anchor date for the enquiry windows (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Bureau lookup tables overriding the built-in set
    #[arg(long)]
    pub(crate) tables: Option<PathBuf>,
    /// Print the full normalized report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Assessment request (JSON)
    pub(crate) request: PathBuf,
    /// Raw bureau response to evaluate against
    #[arg(long)]
    pub(crate) payload: Option<PathBuf>,
    /// Eligibility policy overriding the standard product
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Bureau lookup tables overriding the built-in set
    #[arg(long)]
    pub(crate) tables: Option<PathBuf>,
    /// Print the full assessment record as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ResolveStateArgs {
    /// State name, alias, or two-letter code as typed by the applicant
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Six-digit postal code used when the state text is unusable
    #[arg(long)]
    pub(crate) postal_code: Option<String>,
}

/// Offline commands never reach the bureau.
struct OfflineBureau;

impl BureauGateway for OfflineBureau {
    async fn fetch(&self, _request: &BureauRequest) -> Result<Value, BureauFetchError> {
        Err(BureauFetchError::NotConfigured(
            "bureau pulls are not available offline".to_string(),
        ))
    }
}

fn read_json(path: &Path) -> Result<Value, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let components = load_components(args.tables.as_deref(), None)?;
    let payload = read_json(&args.payload)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let normalized = components.normalizer.normalize_on(&payload, today)?;
    if args.json {
        return print_json(&normalized);
    }
    print!("{}", render_report(&normalized));
    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let components = load_components(args.tables.as_deref(), args.policy.as_deref())?;
    let request: AssessmentRequest = serde_json::from_value(read_json(&args.request)?)?;

    let service = LoanDecisioningService::with_components(
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(InMemoryCaseNotifier::default()),
        Arc::new(OfflineBureau),
        components,
    );
    let application_id = ApplicationId("offline".to_string());

    let check = match args.payload {
        Some(path) => Some(service.record_bureau_payload(&application_id, &read_json(&path)?)?),
        None => None,
    };
    let record = service.assess(&application_id, request)?;

    if args.json {
        return print_json(&record);
    }
    if let Some(CreditCheck::Completed { report, skipped }) = &check {
        println!(
            "Bureau: {} score {} ({} tradelines, {} skipped records)",
            report.hit_status.label(),
            report.score,
            report.accounts.len(),
            skipped.len()
        );
    }
    print!("{}", render_assessment(&record));
    Ok(())
}

pub(crate) fn run_resolve_state(args: ResolveStateArgs) -> Result<(), AppError> {
    let code = AddressStateResolver::default()
        .resolve(args.state.as_deref(), args.postal_code.as_deref());
    if code.is_empty() {
        println!("(unresolved)");
    } else {
        println!("{code}");
    }
    Ok(())
}

fn render_report(normalized: &NormalizedReport) -> String {
    let report = &normalized.report;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Bureau report ({:?} layout, order {})",
        report.source_variant,
        report.report_order_number.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "  Hit status: {}  Score: {} {}",
        report.hit_status.label(),
        report.score,
        report.score_type
    );
    let _ = writeln!(
        out,
        "  Accounts: {} total, {} active, monthly obligations {:.0}",
        report.summary.total_accounts,
        report.summary.active_accounts,
        report.summary.total_monthly_payment
    );
    for account in &report.accounts {
        let worst = account
            .worst_severity()
            .map(|severity| format!("{severity:?}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "    - {} / {} [{:?}] balance {:.0}, EMI {:.0}, worst {}",
            account.institution,
            account.account_type,
            account.status,
            account.current_balance,
            account.emi_amount,
            worst
        );
    }
    let _ = writeln!(
        out,
        "  Enquiries: {} (30d: {}, 90d: {})",
        report.enquiries.len(),
        report.enquiries_last_30_days,
        report.enquiries_last_90_days
    );
    for skipped in &normalized.skipped {
        let _ = writeln!(
            out,
            "  Skipped {:?} #{}: {}",
            skipped.kind, skipped.index, skipped.reason
        );
    }
    out
}

fn render_assessment(record: &AssessmentRecord) -> String {
    let view = record.summary_view();
    let assessment = &record.assessment;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Assessment for {} on {}: {}",
        view.application_id.0, assessment.evaluated_on, view.status
    );
    let _ = writeln!(
        out,
        "  FOIR {:.2}% (limit {:.2}%), capacity {:.2}, eligible principal {}",
        view.foir_pct,
        assessment.inputs.max_allowed_foir_pct,
        assessment.max_repayment_capacity,
        view.eligible_loan_amount
    );
    let _ = writeln!(
        out,
        "  Pricing: {} days at {:.2}%/day",
        assessment.recommended_tenure_days, assessment.recommended_daily_rate_pct
    );
    for (rule, check) in &assessment.policy_checks {
        let marker = if check.passed { "pass" } else { "FAIL" };
        let critical = if check.critical { " (critical)" } else { "" };
        let _ = writeln!(
            out,
            "    [{marker}] {}{critical}: {}",
            rule.key(),
            check.details
        );
    }
    for note in &view.review_notes {
        let _ = writeln!(out, "  Review: {note}");
    }
    for issue in &assessment.validation_issues {
        let _ = writeln!(out, "  Input issue: {issue}");
    }
    out
}
