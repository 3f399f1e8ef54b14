use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::dto::client_dto::{ClientListQuery, ClientRequest};
use crate::service::client_service::{ClientService, ClientServiceImpl};
use crate::util::error::{parse_object_id, validate_payload, ApiJson, HandlerError};

pub async fn list_clients_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Query(query): Query<ClientListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_clients(query).await?))
}

pub async fn create_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    ApiJson(payload): ApiJson<ClientRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let client = service.create_client(payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "client")?;
    Ok(Json(service.get_client(id).await?))
}

pub async fn update_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ClientRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "client")?;
    validate_payload(&payload)?;
    Ok(Json(service.update_client(id, payload).await?))
}

pub async fn delete_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "client")?;
    service.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_client_status_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "client")?;
    Ok(Json(service.toggle_status(id).await?))
}
