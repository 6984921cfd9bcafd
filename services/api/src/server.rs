use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLeadRepository, LoggingEventTransport, LoggingWebhook};
use crate::routes::with_lead_routes;
use admissions_leads::config::AppConfig;
use admissions_leads::error::AppError;
use admissions_leads::telemetry;
use admissions_leads::workflows::admissions::{LeadQualificationService, SuffixedTransport};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let transport = SuffixedTransport::new(
        LoggingEventTransport::default(),
        config.leads.event_suffix.clone(),
    );
    let lead_service = Arc::new(LeadQualificationService::new(
        Arc::new(InMemoryLeadRepository::default()),
        Arc::new(transport),
        Arc::new(LoggingWebhook::default()),
        &config.leads,
    ));

    let app = with_lead_routes(lead_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        event_suffix = %config.leads.event_suffix,
        utc_offset = %config.leads.utc_offset,
        "admissions lead service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
