use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, CreditCheck};
use crate::workflows::eligibility::EligibilityAssessment;

/// The single current assessment for an application. Recalculation replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub application_id: ApplicationId,
    pub assessment: EligibilityAssessment,
    pub recorded_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn summary_view(&self) -> AssessmentSummaryView {
        AssessmentSummaryView {
            application_id: self.application_id.clone(),
            status: self.assessment.status.label(),
            is_eligible: self.assessment.is_eligible,
            foir_pct: self.assessment.foir_pct,
            eligible_loan_amount: self.assessment.eligible_loan_amount,
            review_notes: self.assessment.review_notes.clone(),
        }
    }
}

/// Storage abstraction; writes are upserts keyed by application and the last
/// write wins.
pub trait AssessmentRepository: Send + Sync {
    fn upsert_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch_assessment(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn store_credit_check(
        &self,
        id: &ApplicationId,
        check: CreditCheck,
    ) -> Result<(), RepositoryError>;
    fn fetch_credit_check(&self, id: &ApplicationId)
        -> Result<Option<CreditCheck>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook so case management can refresh its view of an application.
pub trait CaseNotifier: Send + Sync {
    fn notify(&self, alert: CaseAlert) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseAlert {
    pub template: String,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Compact status for list views and alerts.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummaryView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub is_eligible: bool,
    pub foir_pct: f64,
    pub eligible_loan_amount: u64,
    pub review_notes: Vec<String>,
}
