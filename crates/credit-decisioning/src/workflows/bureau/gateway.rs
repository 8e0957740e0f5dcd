use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Applicant identity sent to the bureau for a report pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BureauRequest {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: String,
    pub pan: String,
    pub aadhaar: Option<String>,
    pub mobile: String,
    pub address_line: String,
    pub state_code: String,
    pub postal_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BureauFetchError {
    #[error("bureau did not respond within {}s", .budget.as_secs())]
    Timeout { budget: Duration },
    #[error("bureau transport error: {0}")]
    Transport(String),
    #[error("bureau rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("bureau gateway not configured: {0}")]
    NotConfigured(String),
}

/// Source of raw bureau payloads.
pub trait BureauGateway: Send + Sync {
    fn fetch(
        &self,
        request: &BureauRequest,
    ) -> impl Future<Output = Result<Value, BureauFetchError>> + Send;
}

/// Runs a fetch under a hard time budget. An elapsed budget is a fetch failure,
/// never a partial result.
pub async fn fetch_with_budget<G: BureauGateway>(
    gateway: &G,
    request: &BureauRequest,
    budget: Duration,
) -> Result<Value, BureauFetchError> {
    match tokio::time::timeout(budget, gateway.fetch(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(budget_secs = budget.as_secs(), "bureau fetch timed out");
            Err(BureauFetchError::Timeout { budget })
        }
    }
}
