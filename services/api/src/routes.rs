use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use credit_decisioning::error::AppError;
use credit_decisioning::workflows::applications::{
    decisioning_router, AssessmentRepository, CaseNotifier, DecisioningComponents,
    LoanDecisioningService,
};
use credit_decisioning::workflows::bureau::{BureauGateway, NormalizedReport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct NormalizeRequest {
    pub(crate) payload: Value,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveStateRequest {
    #[serde(default)]
    pub(crate) state: Option<String>,
    #[serde(default)]
    pub(crate) postal_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveStateResponse {
    pub(crate) state_code: String,
    pub(crate) resolved: bool,
}

pub(crate) fn with_operational_routes<R, N, G>(
    service: Arc<LoanDecisioningService<R, N, G>>,
) -> axum::Router
where
    R: AssessmentRepository + 'static,
    N: CaseNotifier + 'static,
    G: BureauGateway + 'static,
{
    decisioning_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/bureau/normalize",
            axum::routing::post(normalize_endpoint),
        )
        .route(
            "/api/v1/address/resolve-state",
            axum::routing::post(resolve_state_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "bureau_pulls": state.bureau_pulls_enabled })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Normalizes a payload without storing it, for underwriters checking a file.
pub(crate) async fn normalize_endpoint(
    Extension(components): Extension<Arc<DecisioningComponents>>,
    Json(request): Json<NormalizeRequest>,
) -> Result<Json<NormalizedReport>, AppError> {
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let normalized = components.normalizer.normalize_on(&request.payload, today)?;
    Ok(Json(normalized))
}

pub(crate) async fn resolve_state_endpoint(
    Extension(components): Extension<Arc<DecisioningComponents>>,
    Json(request): Json<ResolveStateRequest>,
) -> Json<ResolveStateResponse> {
    let state_code = components
        .resolver
        .resolve(request.state.as_deref(), request.postal_code.as_deref());
    Json(ResolveStateResponse {
        resolved: !state_code.is_empty(),
        state_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> Extension<Arc<DecisioningComponents>> {
        Extension(Arc::new(DecisioningComponents::default()))
    }

    fn current_payload() -> Value {
        serde_json::from_str(include_str!(
            "../../../crates/credit-decisioning/fixtures/bureau_current.json"
        ))
        .expect("fixture is valid json")
    }

    #[tokio::test]
    async fn normalize_endpoint_returns_report_and_skips() {
        let request = NormalizeRequest {
            payload: current_payload(),
            today: NaiveDate::from_ymd_opt(2024, 9, 10),
        };

        let Json(body) = normalize_endpoint(components(), Json(request))
            .await
            .expect("payload normalizes");

        assert_eq!(body.report.score, 731);
        assert_eq!(body.report.enquiries_last_90_days, 2);
        assert_eq!(body.skipped.len(), 2);
    }

    #[tokio::test]
    async fn normalize_endpoint_rejects_unknown_layout() {
        let request = NormalizeRequest {
            payload: json!({ "status": "pending" }),
            today: None,
        };

        let error = normalize_endpoint(components(), Json(request))
            .await
            .expect_err("no container");
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn resolve_state_endpoint_falls_back_to_postal_code() {
        let Json(body) = resolve_state_endpoint(
            components(),
            Json(ResolveStateRequest {
                state: Some("  ".to_string()),
                postal_code: Some("110001".to_string()),
            }),
        )
        .await;
        assert_eq!(body.state_code, "DL");
        assert!(body.resolved);

        let Json(body) = resolve_state_endpoint(
            components(),
            Json(ResolveStateRequest {
                state: None,
                postal_code: None,
            }),
        )
        .await;
        assert!(!body.resolved);
    }
}
