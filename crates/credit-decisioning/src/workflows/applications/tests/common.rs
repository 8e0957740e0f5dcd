use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::workflows::applications::domain::{
    AddressSnapshot, ApplicantSnapshot, ApplicationId, AssessmentRequest, CreditCheck,
};
use crate::workflows::applications::repository::{
    AssessmentRecord, AssessmentRepository, CaseAlert, CaseNotifier, NotifyError, RepositoryError,
};
use crate::workflows::applications::{decisioning_router, LoanDecisioningService};
use crate::workflows::bureau::{BureauFetchError, BureauGateway, BureauRequest};
use crate::workflows::eligibility::EligibilityConfig;

pub(super) type TestService = LoanDecisioningService<MemoryRepository, MemoryNotifier, StubGateway>;

pub(super) fn application_id() -> ApplicationId {
    ApplicationId("LA-2024-0042".to_string())
}

pub(super) fn evaluated_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 15).expect("valid date")
}

pub(super) fn applicant() -> ApplicantSnapshot {
    ApplicantSnapshot {
        first_name: "Priya".to_string(),
        middle_name: Some(" ".to_string()),
        last_name: "Nair".to_string(),
        date_of_birth: "1992-07-19".to_string(),
        pan: "abcpn4321m".to_string(),
        aadhaar: None,
        mobile: "+91 98450 12345".to_string(),
        address: AddressSnapshot {
            line: "221 Indiranagar 2nd Stage".to_string(),
            state: Some("Karnataka".to_string()),
            postal_code: Some("560038".to_string()),
        },
    }
}

/// Bureau payload in the current layout: hit, score 744, two active loans with
/// a combined 9,500 monthly instalment.
pub(super) fn bureau_payload() -> Value {
    json!({
        "InquiryResponseHeader": { "HitCode": "10", "Date": "2024-09-01", "ReportOrderNO": "ORD-88" },
        "CCRResponse": {
            "CIRReportDataLst": [{
                "CIRReportData": {
                    "IDAndContactInfo": {
                        "PersonalInfo": { "Name": { "FirstName": "PRIYA", "LastName": "NAIR" } },
                        "IdentityInfo": { "PANId": [ { "IdNumber": "ABCPN4321M" } ] }
                    },
                    "RetailAccountDetails": [
                        {
                            "Institution": "Axis Bank",
                            "AccountType": "Consumer Loan",
                            "AccountStatus": "Current Account",
                            "Open": "Yes",
                            "Balance": "42000",
                            "InstallmentAmount": "4500",
                            "History48Months": "000000000"
                        },
                        {
                            "Institution": "Bajaj Finance",
                            "AccountType": "Personal Loan",
                            "AccountStatus": "Current Account",
                            "Open": "Yes",
                            "Balance": "120000",
                            "InstallmentAmount": "5000",
                            "History48Months": "000030000"
                        }
                    ],
                    "Enquiries": [ { "Date": "2024-08-20", "Institution": "HDFC", "RequestPurpose": "Personal Loan" } ],
                    "ScoreDetails": [ { "Type": "ERS", "Version": "4.0", "Value": "744" } ]
                }
            }]
        }
    })
}

pub(super) fn assessment_request() -> AssessmentRequest {
    AssessmentRequest {
        evaluated_on: Some(evaluated_on()),
        date_of_birth: Some("1992-07-19".to_string()),
        employment_start: Some("2021-02-01".to_string()),
        net_income: Some(100_000.0),
        gross_income: Some(125_000.0),
        proposed_emi: Some(15_000.0),
        tenure_days: Some(30),
        daily_rate_pct: Some(1.0),
        ..AssessmentRequest::default()
    }
}

pub(super) fn build_service(gateway: StubGateway) -> (TestService, Arc<MemoryRepository>, Arc<MemoryNotifier>) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = LoanDecisioningService::new(
        repository.clone(),
        notifier.clone(),
        Arc::new(gateway),
        EligibilityConfig::default(),
    );
    (service, repository, notifier)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    decisioning_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    assessments: Mutex<HashMap<ApplicationId, AssessmentRecord>>,
    checks: Mutex<HashMap<ApplicationId, CreditCheck>>,
}

impl AssessmentRepository for MemoryRepository {
    fn upsert_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        self.assessments
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch_assessment(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.assessments.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn store_credit_check(
        &self,
        id: &ApplicationId,
        check: CreditCheck,
    ) -> Result<(), RepositoryError> {
        self.checks
            .lock()
            .expect("repository mutex poisoned")
            .insert(id.clone(), check);
        Ok(())
    }

    fn fetch_credit_check(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<CreditCheck>, RepositoryError> {
        let guard = self.checks.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

impl MemoryRepository {
    pub(super) fn assessment_count(&self) -> usize {
        self.assessments.lock().expect("repository mutex poisoned").len()
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn upsert_assessment(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_assessment(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_credit_check(
        &self,
        _id: &ApplicationId,
        _check: CreditCheck,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_credit_check(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<CreditCheck>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<CaseAlert>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<CaseAlert> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl CaseNotifier for MemoryNotifier {
    fn notify(&self, alert: CaseAlert) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(alert);
        Ok(())
    }
}

pub(super) struct DisconnectedNotifier;

impl CaseNotifier for DisconnectedNotifier {
    fn notify(&self, _alert: CaseAlert) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("case webhook unreachable".to_string()))
    }
}

/// Canned bureau behaviour for a test.
pub(super) enum StubResponse {
    Payload(Value),
    Rejected(u16),
    Delay(Duration),
    NotConfigured,
}

pub(super) struct StubGateway {
    response: StubResponse,
    requests: Mutex<Vec<BureauRequest>>,
}

impl StubGateway {
    pub(super) fn new(response: StubResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn returning(payload: Value) -> Self {
        Self::new(StubResponse::Payload(payload))
    }

    pub(super) fn requests(&self) -> Vec<BureauRequest> {
        self.requests.lock().expect("gateway mutex poisoned").clone()
    }
}

impl BureauGateway for StubGateway {
    async fn fetch(&self, request: &BureauRequest) -> Result<Value, BureauFetchError> {
        self.requests
            .lock()
            .expect("gateway mutex poisoned")
            .push(request.clone());

        match &self.response {
            StubResponse::Payload(payload) => Ok(payload.clone()),
            StubResponse::Rejected(status) => Err(BureauFetchError::Rejected {
                status: *status,
                message: "consumer not found".to_string(),
            }),
            StubResponse::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(bureau_payload())
            }
            StubResponse::NotConfigured => Err(BureauFetchError::NotConfigured(
                "BUREAU_API_KEY missing".to_string(),
            )),
        }
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
