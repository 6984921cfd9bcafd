use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::counselors::Counselor;
use super::domain::{AttributeRecord, LeadId};
use super::repository::{
    EventTransport, LeadRecord, LeadRepository, LeadWebhook, RepositoryError,
};
use super::service::{LeadQualificationService, LeadServiceError};

type SharedService<R, T, W> = Arc<LeadQualificationService<R, T, W>>;

#[derive(Debug, Deserialize)]
pub(crate) struct SlotQuery {
    pub(crate) date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookingRequest {
    pub(crate) date: NaiveDate,
    pub(crate) hour: u32,
}

/// Router builder exposing the lead-capture endpoints.
pub fn lead_router<R, T, W>(service: SharedService<R, T, W>) -> Router
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    Router::new()
        .route("/api/v1/leads", post(submit_handler::<R, T, W>))
        .route(
            "/api/v1/leads/:lead_id",
            get(status_handler::<R, T, W>).put(resubmit_handler::<R, T, W>),
        )
        .route(
            "/api/v1/leads/:lead_id/booking-view",
            post(booking_view_handler::<R, T, W>),
        )
        .route(
            "/api/v1/leads/:lead_id/slots",
            get(lead_slots_handler::<R, T, W>),
        )
        .route(
            "/api/v1/leads/:lead_id/booking",
            post(booking_handler::<R, T, W>),
        )
        .route(
            "/api/v1/leads/:lead_id/complete",
            post(complete_handler::<R, T, W>),
        )
        .route(
            "/api/v1/counselors/:counselor/slots",
            get(counselor_slots_handler::<R, T, W>),
        )
        .with_state(service)
}

fn error_response(error: LeadServiceError) -> Response {
    let status = match &error {
        LeadServiceError::Booking(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeadServiceError::Completed(_) => StatusCode::CONFLICT,
        LeadServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LeadServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LeadServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn record_response(
    status: StatusCode,
    result: Result<LeadRecord, LeadServiceError>,
) -> Response {
    match result {
        Ok(record) => (status, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    axum::Json(attributes): axum::Json<AttributeRecord>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    record_response(StatusCode::CREATED, service.submit_page_one(attributes))
}

pub(crate) async fn resubmit_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    Path(lead_id): Path<String>,
    axum::Json(attributes): axum::Json<AttributeRecord>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    record_response(
        StatusCode::OK,
        service.resubmit_page_one(&LeadId(lead_id), attributes),
    )
}

pub(crate) async fn status_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    record_response(StatusCode::OK, service.get(&LeadId(lead_id)))
}

pub(crate) async fn booking_view_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    record_response(StatusCode::OK, service.view_booking_page(&LeadId(lead_id)))
}

pub(crate) async fn lead_slots_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    Path(lead_id): Path<String>,
    Query(query): Query<SlotQuery>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    match service.available_slots(&LeadId(lead_id), query.date) {
        Ok(slots) => {
            let payload = json!({ "date": query.date, "slots": slots });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn booking_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<BookingRequest>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    record_response(
        StatusCode::OK,
        service.book_counselling(&LeadId(lead_id), request.date, request.hour),
    )
}

pub(crate) async fn complete_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    record_response(StatusCode::OK, service.complete(&LeadId(lead_id)))
}

pub(crate) async fn counselor_slots_handler<R, T, W>(
    State(service): State<SharedService<R, T, W>>,
    Path(counselor): Path<String>,
    Query(query): Query<SlotQuery>,
) -> Response
where
    R: LeadRepository + 'static,
    T: EventTransport + 'static,
    W: LeadWebhook + 'static,
{
    let counselor: Counselor = match counselor.parse() {
        Ok(counselor) => counselor,
        Err(error) => {
            let payload = json!({ "error": format!("{error}") });
            return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
        }
    };

    let slots = service.slots_for(counselor, query.date);
    let payload = json!({
        "counselor": counselor.profile(),
        "date": query.date,
        "slots": slots,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
