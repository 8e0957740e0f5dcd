use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use super::domain::{ApplicantSnapshot, ApplicationId, AssessmentRequest, CreditCheck};
use super::repository::{AssessmentRepository, CaseNotifier, RepositoryError};
use super::service::{DecisioningServiceError, LoanDecisioningService};
use crate::workflows::bureau::BureauGateway;

/// Router builder exposing bureau intake and eligibility endpoints.
pub fn decisioning_router<R, N, G>(service: Arc<LoanDecisioningService<R, N, G>>) -> Router
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications/:application_id/bureau-report",
            post(bureau_report_handler::<R, N, G>).get(credit_check_handler::<R, N, G>),
        )
        .route(
            "/api/v1/applications/:application_id/bureau-pull",
            post(bureau_pull_handler::<R, N, G>),
        )
        .route(
            "/api/v1/applications/:application_id/assessment",
            post(assess_handler::<R, N, G>).get(assessment_handler::<R, N, G>),
        )
        .with_state(service)
}

pub(crate) async fn bureau_report_handler<R, N, G>(
    State(service): State<Arc<LoanDecisioningService<R, N, G>>>,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<Value>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.record_bureau_payload(&id, &payload) {
        Ok(check) => credit_check_response(check, StatusCode::UNPROCESSABLE_ENTITY),
        Err(error) => error_response(&id, error),
    }
}

pub(crate) async fn credit_check_handler<R, N, G>(
    State(service): State<Arc<LoanDecisioningService<R, N, G>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.credit_check(&id) {
        Ok(check) => (StatusCode::OK, axum::Json(check)).into_response(),
        Err(error) => error_response(&id, error),
    }
}

pub(crate) async fn bureau_pull_handler<R, N, G>(
    State(service): State<Arc<LoanDecisioningService<R, N, G>>>,
    Path(application_id): Path<String>,
    axum::Json(applicant): axum::Json<ApplicantSnapshot>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.pull_bureau_report(&id, &applicant).await {
        Ok(check) => credit_check_response(check, StatusCode::BAD_GATEWAY),
        Err(error) => error_response(&id, error),
    }
}

pub(crate) async fn assess_handler<R, N, G>(
    State(service): State<Arc<LoanDecisioningService<R, N, G>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<AssessmentRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.assess(&id, request) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(&id, error),
    }
}

pub(crate) async fn assessment_handler<R, N, G>(
    State(service): State<Arc<LoanDecisioningService<R, N, G>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(&id, error),
    }
}

/// Completed checks are created; unavailable ones are stored but reported with
/// `unavailable_status` so callers never mistake them for a usable report.
fn credit_check_response(check: CreditCheck, unavailable_status: StatusCode) -> Response {
    let status = match check {
        CreditCheck::Completed { .. } => StatusCode::CREATED,
        CreditCheck::Unavailable { .. } => unavailable_status,
    };
    (status, axum::Json(check)).into_response()
}

fn error_response(id: &ApplicationId, error: DecisioningServiceError) -> Response {
    let status = match &error {
        DecisioningServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DecisioningServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DecisioningServiceError::Gateway(_) => StatusCode::SERVICE_UNAVAILABLE,
        DecisioningServiceError::Repository(RepositoryError::Unavailable(_))
        | DecisioningServiceError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "application_id": id.0,
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
