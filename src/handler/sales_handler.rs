use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};

use crate::dto::sales_dto::{SalesQuery, UnpaidQuery, UpdateSaleRequest};
use crate::service::sales_service::{SalesService, SalesServiceImpl};
use crate::util::error::{parse_object_id, validate_payload, ApiJson, HandlerError};

pub async fn list_sales_handler(
    State(service): State<Arc<SalesServiceImpl>>,
    Query(query): Query<SalesQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_sales(query).await?))
}

pub async fn sales_summary_handler(
    State(service): State<Arc<SalesServiceImpl>>,
    Query(query): Query<SalesQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.summary(query).await?))
}

pub async fn unpaid_orders_handler(
    State(service): State<Arc<SalesServiceImpl>>,
    Query(query): Query<UnpaidQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.unpaid_orders(query).await?))
}

pub async fn update_sale_handler(
    State(service): State<Arc<SalesServiceImpl>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateSaleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "sale")?;
    validate_payload(&payload)?;
    Ok(Json(service.update_sale(id, payload).await?))
}
