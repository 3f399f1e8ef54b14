use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::dto::quote_dto::{CreateQuoteRequest, MissingQuotesQuery, QuoteListQuery, UpdateQuoteRequest};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::util::error::{parse_object_id, validate_payload, ApiJson, HandlerError};

pub async fn list_quotes_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_quotes(query).await?))
}

pub async fn list_missing_quotes_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Query(query): Query<MissingQuotesQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_missing(query).await?))
}

pub async fn create_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    ApiJson(payload): ApiJson<CreateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let quote = service.create_quote(payload).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

pub async fn get_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.get_quote(id).await?))
}

pub async fn update_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    validate_payload(&payload)?;
    Ok(Json(service.update_quote(id, payload).await?))
}

pub async fn delete_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    service.delete_quote(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
