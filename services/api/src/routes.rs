use crate::infra::AppState;
use admissions_leads::error::AppError;
use admissions_leads::workflows::admissions::{
    lead_router, EventTransport, LeadQualificationService, LeadRepository, LeadWebhook,
};
use admissions_leads::workflows::import::{LeadCsvImporter, LeadImportReport};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct RescoreRequest {
    pub(crate) csv: String,
}

pub(crate) fn with_lead_routes<R, T, W>(
    service: Arc<LeadQualificationService<R, T, W>>,
) -> axum::Router
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    lead_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/lead-exports/rescore",
            axum::routing::post(rescore_endpoint),
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
        json!({ "status": "ready" })
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

pub(crate) async fn rescore_endpoint(
    Json(payload): Json<RescoreRequest>,
) -> Result<Json<LeadImportReport>, AppError> {
    let report = LeadCsvImporter::from_reader(Cursor::new(payload.csv.into_bytes()))?;
    Ok(Json(report))
}
