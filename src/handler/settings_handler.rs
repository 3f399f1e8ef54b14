use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::IntoResponse,
};

use crate::dto::settings_dto::UpdateSettingsRequest;
use crate::service::settings_service::{SettingsService, SettingsServiceImpl};
use crate::util::error::{validate_payload, ApiJson, HandlerError};

pub async fn get_settings_handler(
    State(service): State<Arc<SettingsServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_settings().await?))
}

pub async fn update_settings_handler(
    State(service): State<Arc<SettingsServiceImpl>>,
    ApiJson(payload): ApiJson<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    Ok(Json(service.update_settings(payload).await?))
}
