use chrono::NaiveDate;
use credit_decisioning::config::{BureauConfig, BureauCredentials};
use credit_decisioning::error::AppError;
use credit_decisioning::workflows::applications::{
    ApplicationId, AssessmentRecord, AssessmentRepository, CaseAlert, CaseNotifier,
    CreditCheck, DecisioningComponents, NotifyError, RepositoryError,
};
use credit_decisioning::workflows::bureau::{
    BureauFetchError, BureauGateway, BureauRequest, BureauResponseNormalizer, BureauTables,
};
use credit_decisioning::workflows::eligibility::{EligibilityConfig, EligibilityEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) bureau_pulls_enabled: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    assessments: Arc<Mutex<HashMap<ApplicationId, AssessmentRecord>>>,
    checks: Arc<Mutex<HashMap<ApplicationId, CreditCheck>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn upsert_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        lock(&self.assessments)?.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch_assessment(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(lock(&self.assessments)?.get(id).cloned())
    }

    fn store_credit_check(
        &self,
        id: &ApplicationId,
        check: CreditCheck,
    ) -> Result<(), RepositoryError> {
        lock(&self.checks)?.insert(id.clone(), check);
        Ok(())
    }

    fn fetch_credit_check(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<CreditCheck>, RepositoryError> {
        Ok(lock(&self.checks)?.get(id).cloned())
    }
}

/// Keeps alerts in memory and mirrors them to the log until case management
/// exposes a webhook.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCaseNotifier {
    events: Arc<Mutex<Vec<CaseAlert>>>,
}

impl CaseNotifier for InMemoryCaseNotifier {
    fn notify(&self, alert: CaseAlert) -> Result<(), NotifyError> {
        info!(
            template = %alert.template,
            application_id = %alert.application_id.0,
            "case alert raised"
        );
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotifyError::Transport("alert buffer poisoned".to_string()))?;
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryCaseNotifier {
    #[cfg(test)]
    pub(crate) fn events(&self) -> Vec<CaseAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

struct BureauEndpoint {
    client: reqwest::Client,
    credentials: BureauCredentials,
    timeout: Duration,
}

/// Bureau collaborator over HTTPS. Built even without credentials so uploads
/// keep working; pulls then fail with [`BureauFetchError::NotConfigured`].
pub(crate) struct HttpBureauGateway {
    endpoint: Result<BureauEndpoint, String>,
}

impl HttpBureauGateway {
    pub(crate) fn from_config(config: &BureauConfig) -> Self {
        let endpoint = config
            .credentials()
            .map_err(|err| err.to_string())
            .and_then(|credentials| {
                let client = reqwest::Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(|err| format!("failed to build bureau client: {err}"))?;
                Ok(BureauEndpoint {
                    client,
                    credentials,
                    timeout: config.timeout,
                })
            });

        if let Err(reason) = &endpoint {
            warn!(%reason, "bureau pulls disabled");
        }

        Self { endpoint }
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.endpoint.is_ok()
    }
}

impl BureauGateway for HttpBureauGateway {
    async fn fetch(&self, request: &BureauRequest) -> Result<Value, BureauFetchError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .map_err(|reason| BureauFetchError::NotConfigured(reason.clone()))?;
        let url = format!(
            "{}/credit-report",
            endpoint.credentials.base_url.trim_end_matches('/')
        );

        let response = endpoint
            .client
            .post(url)
            .bearer_auth(&endpoint.credentials.api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    BureauFetchError::Timeout {
                        budget: endpoint.timeout,
                    }
                } else {
                    BureauFetchError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BureauFetchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| BureauFetchError::Transport(err.to_string()))
    }
}

/// Standard components, with bureau tables and policy swapped in when files
/// are supplied.
pub(crate) fn load_components(
    tables_path: Option<&Path>,
    policy_path: Option<&Path>,
) -> Result<DecisioningComponents, AppError> {
    let tables = match tables_path {
        Some(path) => {
            info!(path = %path.display(), "loading bureau tables");
            BureauTables::from_path(path)?
        }
        None => BureauTables::standard(),
    };
    let policy = match policy_path {
        Some(path) => {
            info!(path = %path.display(), "loading eligibility policy");
            EligibilityConfig::from_path(path)?
        }
        None => EligibilityConfig::default(),
    };

    Ok(DecisioningComponents {
        engine: EligibilityEngine::new(policy),
        normalizer: BureauResponseNormalizer::new(tables),
        ..DecisioningComponents::default()
    })
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
