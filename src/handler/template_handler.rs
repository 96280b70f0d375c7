use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::dto::template_dto::TemplateInput;
use crate::handler::{parse_object_id, validate_payload};
use crate::service::template_service::{TemplateService, TemplateServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_templates_handler(
    State(service): State<Arc<TemplateServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let templates = service.list_templates().await?;
    Ok(Json(templates))
}

pub async fn create_template_handler(
    State(service): State<Arc<TemplateServiceImpl>>,
    Json(payload): Json<TemplateInput>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let template = service.create_template(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_template_handler(
    State(service): State<Arc<TemplateServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<TemplateInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    validate_payload(&payload)?;
    let template = service.update_template(id, payload.into()).await?;
    Ok(Json(template))
}
