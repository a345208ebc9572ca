use crate::cli::ServeArgs;
use crate::infra::{dispatcher_for, AppState};
use crate::routes::with_recruitment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_match::config::AppConfig;
use talent_match::error::AppError;
use talent_match::telemetry;
use talent_match::workflows::recruitment::{
    InMemoryRecruitmentStore, KeywordOverlapScorer, RecruitmentService,
};
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
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryRecruitmentStore::new());
    let recruitment_service = Arc::new(RecruitmentService::new(
        store,
        Arc::new(KeywordOverlapScorer::new()),
        dispatcher_for(&config.notification)?,
        config.service_settings(),
    ));

    let app = with_recruitment_routes(recruitment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        fan_out_mode = ?config.matching.fan_out_mode,
        smtp_relay = config.notification.smtp.is_some(),
        "talent matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
