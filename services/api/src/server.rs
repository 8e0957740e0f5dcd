use crate::cli::ServeArgs;
use crate::infra::{
    load_components, AppState, HttpBureauGateway, InMemoryAssessmentRepository,
    InMemoryCaseNotifier,
};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_decisioning::config::AppConfig;
use credit_decisioning::error::AppError;
use credit_decisioning::telemetry;
use credit_decisioning::workflows::applications::LoanDecisioningService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let components = load_components(config.bureau.tables_path.as_deref(), args.policy.as_deref())?;
    let gateway = Arc::new(HttpBureauGateway::from_config(&config.bureau));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        bureau_pulls_enabled: gateway.is_configured(),
    };

    let decisioning_service = Arc::new(
        LoanDecisioningService::with_components(
            Arc::new(InMemoryAssessmentRepository::default()),
            Arc::new(InMemoryCaseNotifier::default()),
            gateway,
            components.clone(),
        )
        .with_fetch_budget(config.bureau.timeout),
    );

    let app = with_operational_routes(decisioning_service)
        .layer(Extension(Arc::new(components)))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit decisioning service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
