use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::service::catalog_service::{CatalogService, CatalogServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_services_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let services = service.list_active_services().await?;
    Ok(Json(services))
}
