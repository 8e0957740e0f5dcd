use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::domain::{
    ApplicantSnapshot, ApplicationId, AssessmentRequest, CreditCheck, ValidationError,
};
use super::repository::{
    AssessmentRecord, AssessmentRepository, CaseAlert, CaseNotifier, NotifyError, RepositoryError,
};
use crate::workflows::address::AddressStateResolver;
use crate::workflows::bureau::{
    fetch_with_budget, BureauFetchError, BureauGateway, BureauResponseNormalizer,
};
use crate::workflows::eligibility::{
    CreditStanding, EligibilityConfig, EligibilityEngine, EligibilityInputs, ProposedObligation,
};
use crate::workflows::income::{IncomeAggregator, IncomeSummary};

/// Wall-clock budget for a bureau pull when none is configured.
pub const DEFAULT_FETCH_BUDGET: Duration = Duration::from_secs(30);

const NO_REPORT_ON_FILE: &str = "no bureau report on file";

/// Pure components the service composes. Tables and policy are swappable per product.
#[derive(Debug, Clone, Default)]
pub struct DecisioningComponents {
    pub engine: EligibilityEngine,
    pub normalizer: BureauResponseNormalizer,
    pub resolver: AddressStateResolver,
    pub aggregator: IncomeAggregator,
}

/// Service composing bureau intake, income reconciliation, and eligibility
/// evaluation over a repository and a case notifier.
pub struct LoanDecisioningService<R, N, G> {
    repository: Arc<R>,
    notifier: Arc<N>,
    gateway: Arc<G>,
    components: Arc<DecisioningComponents>,
    fetch_budget: Duration,
}

impl<R, N, G> LoanDecisioningService<R, N, G>
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        gateway: Arc<G>,
        config: EligibilityConfig,
    ) -> Self {
        let components = DecisioningComponents {
            engine: EligibilityEngine::new(config),
            ..DecisioningComponents::default()
        };
        Self::with_components(repository, notifier, gateway, components)
    }

    pub fn with_components(
        repository: Arc<R>,
        notifier: Arc<N>,
        gateway: Arc<G>,
        components: DecisioningComponents,
    ) -> Self {
        Self {
            repository,
            notifier,
            gateway,
            components: Arc::new(components),
            fetch_budget: DEFAULT_FETCH_BUDGET,
        }
    }

    pub fn with_fetch_budget(mut self, budget: Duration) -> Self {
        self.fetch_budget = budget;
        self
    }

    pub fn components(&self) -> &DecisioningComponents {
        &self.components
    }

    /// Normalizes a raw bureau payload and stores the result. An unreadable
    /// payload is stored as an unavailable credit check rather than an error.
    pub fn record_bureau_payload(
        &self,
        application_id: &ApplicationId,
        payload: &Value,
    ) -> Result<CreditCheck, DecisioningServiceError> {
        let check = match self.components.normalizer.normalize(payload) {
            Ok(normalized) => {
                if !normalized.skipped.is_empty() {
                    warn!(
                        application_id = %application_id.0,
                        skipped = normalized.skipped.len(),
                        "bureau report stored with skipped records"
                    );
                }
                CreditCheck::from(normalized)
            }
            Err(error) => {
                warn!(application_id = %application_id.0, %error, "bureau payload unusable");
                CreditCheck::unavailable(format!("bureau report unreadable: {error}"))
            }
        };

        self.store_check(application_id, check)
    }

    /// Stores a failed fetch so assessments report the credit check as unavailable.
    pub fn record_bureau_failure(
        &self,
        application_id: &ApplicationId,
        error: &BureauFetchError,
    ) -> Result<CreditCheck, DecisioningServiceError> {
        warn!(application_id = %application_id.0, %error, "bureau fetch failed");
        self.store_check(application_id, CreditCheck::unavailable(error.to_string()))
    }

    /// Pulls a report under the configured budget. Transport failures and
    /// timeouts are recorded, never retried; a missing gateway configuration is
    /// returned to the caller without touching the store.
    pub async fn pull_bureau_report(
        &self,
        application_id: &ApplicationId,
        applicant: &ApplicantSnapshot,
    ) -> Result<CreditCheck, DecisioningServiceError> {
        let request = applicant.bureau_request(&self.components.resolver)?;

        match fetch_with_budget(self.gateway.as_ref(), &request, self.fetch_budget).await {
            Ok(payload) => self.record_bureau_payload(application_id, &payload),
            Err(error @ BureauFetchError::NotConfigured(_)) => {
                Err(DecisioningServiceError::Gateway(error))
            }
            Err(error) => self.record_bureau_failure(application_id, &error),
        }
    }

    /// Evaluates eligibility against the stored credit check and replaces the
    /// application's current assessment.
    pub fn assess(
        &self,
        application_id: &ApplicationId,
        request: AssessmentRequest,
    ) -> Result<AssessmentRecord, DecisioningServiceError> {
        let validated = request.validate();
        let evidence = &request.income_evidence;
        let income = (!evidence.extracted.is_empty() || !evidence.manual.is_empty()).then(|| {
            self.components
                .aggregator
                .aggregate(&evidence.extracted, &evidence.manual)
        });

        let credit_check = self.repository.fetch_credit_check(application_id)?;
        let credit = credit_check
            .as_ref()
            .map(CreditCheck::standing)
            .unwrap_or_else(|| CreditStanding::unavailable(NO_REPORT_ON_FILE));
        let reported_obligations = credit_check
            .as_ref()
            .and_then(CreditCheck::report)
            .map(|report| report.summary.total_monthly_payment);

        let net_income = validated
            .net_income
            .or_else(|| monthly_net(income.as_ref()))
            .unwrap_or(0.0);
        let gross_income = validated
            .gross_income
            .or_else(|| monthly_gross(income.as_ref()))
            .unwrap_or(0.0);
        let total_deductions = income
            .as_ref()
            .filter(|summary| summary.salary_slip_count > 0)
            .map(|summary| summary.avg_monthly_deductions)
            .unwrap_or_else(|| (gross_income - net_income).max(0.0));

        let proposed = validated
            .proposed_emi
            .map(ProposedObligation::Emi)
            .or(validated.requested_principal.map(ProposedObligation::Principal));

        let inputs = EligibilityInputs {
            evaluated_on: request
                .evaluated_on
                .unwrap_or_else(|| Local::now().date_naive()),
            date_of_birth: validated.date_of_birth,
            employment_start: validated.employment_start,
            gross_income,
            net_income,
            total_deductions,
            existing_emi: validated
                .existing_emi
                .or(reported_obligations)
                .unwrap_or(0.0),
            proposed,
            tenure_days: validated.tenure_days,
            daily_rate_pct: validated.daily_rate_pct,
            max_foir_pct: None,
            credit,
        };

        let mut assessment = self.components.engine.evaluate(&inputs);
        assessment.income_summary = income;
        assessment.validation_issues = validated.issues.iter().map(ToString::to_string).collect();

        let record = AssessmentRecord {
            application_id: application_id.clone(),
            assessment,
            recorded_at: Utc::now(),
        };
        self.repository.upsert_assessment(record.clone())?;

        info!(
            application_id = %application_id.0,
            status = record.assessment.status.label(),
            foir_pct = record.assessment.foir_pct,
            eligible_loan_amount = record.assessment.eligible_loan_amount,
            "assessment upserted"
        );

        let mut details = BTreeMap::new();
        details.insert(
            "status".to_string(),
            record.assessment.status.label().to_string(),
        );
        details.insert(
            "foir_pct".to_string(),
            format!("{:.2}", record.assessment.foir_pct),
        );
        details.insert(
            "eligible_loan_amount".to_string(),
            record.assessment.eligible_loan_amount.to_string(),
        );
        // Alert delivery is best effort once the record is stored.
        if let Err(error) = self.notifier.notify(CaseAlert {
            template: "assessment_updated".to_string(),
            application_id: application_id.clone(),
            details,
        }) {
            warn!(application_id = %application_id.0, %error, "assessment alert not delivered");
        }

        Ok(record)
    }

    /// Current assessment for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<AssessmentRecord, DecisioningServiceError> {
        let record = self
            .repository
            .fetch_assessment(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn credit_check(
        &self,
        application_id: &ApplicationId,
    ) -> Result<CreditCheck, DecisioningServiceError> {
        let check = self
            .repository
            .fetch_credit_check(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(check)
    }

    fn store_check(
        &self,
        application_id: &ApplicationId,
        check: CreditCheck,
    ) -> Result<CreditCheck, DecisioningServiceError> {
        self.repository
            .store_credit_check(application_id, check.clone())?;

        if let CreditCheck::Unavailable { reason } = &check {
            let mut details = BTreeMap::new();
            details.insert("reason".to_string(), reason.clone());
            self.notifier.notify(CaseAlert {
                template: "credit_check_unavailable".to_string(),
                application_id: application_id.clone(),
                details,
            })?;
        }

        Ok(check)
    }
}

fn monthly_net(income: Option<&IncomeSummary>) -> Option<f64> {
    income
        .filter(|summary| summary.salary_slip_count > 0)
        .map(|summary| summary.avg_monthly_net)
}

/// Slips when present, otherwise annual income spread over twelve months.
fn monthly_gross(income: Option<&IncomeSummary>) -> Option<f64> {
    let summary = income?;
    if summary.salary_slip_count > 0 {
        Some(summary.avg_monthly_gross)
    } else if summary.annual_record_count > 0 {
        Some(summary.avg_annual_income / 12.0)
    } else {
        None
    }
}

/// Error raised by the decisioning service.
#[derive(Debug, thiserror::Error)]
pub enum DecisioningServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Gateway(BureauFetchError),
}
