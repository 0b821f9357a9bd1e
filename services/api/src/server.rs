use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDealRepository};
use crate::routes::with_engine_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lending_crm::config::AppConfig;
use lending_crm::deals::DealService;
use lending_crm::error::AppError;
use lending_crm::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let repository = Arc::new(InMemoryDealRepository::default());
    let deal_service = Arc::new(DealService::new(repository, config.underwriting));

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        guard: Arc::new(deal_service.guard().clone()),
    };

    let app = with_engine_routes(deal_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_term_months = config.underwriting.max_term_months,
        "lending decision service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
