//! Loan application decisioning: bureau intake, assessment upserts, and the
//! HTTP surface case management talks to.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AddressSnapshot, ApplicantSnapshot, ApplicationId, AssessmentRequest, CreditCheck,
    IncomeEvidenceBundle, ValidatedRequest, ValidationError,
};
pub use repository::{
    AssessmentRecord, AssessmentRepository, AssessmentSummaryView, CaseAlert, CaseNotifier,
    NotifyError, RepositoryError,
};
pub use router::decisioning_router;
pub use service::{
    DecisioningComponents, DecisioningServiceError, LoanDecisioningService, DEFAULT_FETCH_BUDGET,
};
