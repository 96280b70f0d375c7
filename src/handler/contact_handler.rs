use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::dto::contact_dto::{ContactInput, UnreadCount};
use crate::handler::{parse_object_id, validate_payload};
use crate::service::contact_service::{ContactService, ContactServiceImpl};
use crate::util::error::HandlerError;

pub async fn submit_contact_handler(
    State(service): State<Arc<ContactServiceImpl>>,
    Json(payload): Json<ContactInput>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let contact = service.submit(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn open_contact_handler(
    State(service): State<Arc<ContactServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    let contact = service.open(id).await?;
    Ok(Json(contact))
}

pub async fn unread_count_handler(
    State(service): State<Arc<ContactServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let unread = service.unread_count().await?;
    Ok(Json(UnreadCount { unread }))
}
