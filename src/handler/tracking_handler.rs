use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::dto::tracking_dto::{
    BatchShipmentRequest, EligibleQuotesQuery, TrackingListQuery, TrackingPaymentRequest, TrackingRequest,
    TrackingStatusRequest,
};
use crate::service::tracking_service::{TrackingService, TrackingServiceImpl};
use crate::util::error::{parse_object_id, validate_payload, ApiJson, HandlerError};

pub async fn list_trackings_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    Query(query): Query<TrackingListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_trackings(query).await?))
}

pub async fn create_tracking_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    ApiJson(payload): ApiJson<TrackingRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let tracking = service.create_tracking(payload).await?;
    Ok((StatusCode::CREATED, Json(tracking)))
}

pub async fn create_batch_shipment_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    ApiJson(payload): ApiJson<BatchShipmentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let tracking = service.create_batch_shipment(payload).await?;
    Ok((StatusCode::CREATED, Json(tracking)))
}

pub async fn eligible_quotes_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    Query(query): Query<EligibleQuotesQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.eligible_quotes(query).await?))
}

pub async fn get_tracking_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "tracking")?;
    Ok(Json(service.get_tracking(id).await?))
}

pub async fn update_tracking_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<TrackingRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "tracking")?;
    validate_payload(&payload)?;
    Ok(Json(service.update_tracking(id, payload).await?))
}

pub async fn update_tracking_status_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<TrackingStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "tracking")?;
    validate_payload(&payload)?;
    Ok(Json(service.update_status(id, payload).await?))
}

pub async fn update_tracking_payment_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<TrackingPaymentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "tracking")?;
    validate_payload(&payload)?;
    Ok(Json(service.update_payment(id, payload).await?))
}

pub async fn delete_tracking_handler(
    State(service): State<Arc<TrackingServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "tracking")?;
    service.delete_tracking(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
