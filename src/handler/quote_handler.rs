use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::quote_dto::{CreateQuoteRequestDto, PageQuery, QuoteInput, QuoteItemInput};
use crate::handler::{parse_object_id, validate_payload};
use crate::model::quote_request::RequestLocation;
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::util::error::{HandlerError, ServiceError};

pub async fn submit_quote_request_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Json(payload): Json<CreateQuoteRequestDto>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[submit_quote_request_handler] Handler called");
    validate_payload(&payload)?;
    let request = service.submit_request(payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_quote_requests_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let (page, limit) = query.resolve();
    let requests = service.list_requests(page, limit).await?;
    Ok(Json(requests))
}

pub async fn get_quote_request_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    let request = service.get_request(id).await?;
    Ok(Json(request))
}

/// Pre-fill lookup. Unknown or malformed ids answer 404 with empty values.
pub async fn quote_request_location_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    let not_found = || (StatusCode::NOT_FOUND, Json(RequestLocation::not_found())).into_response();
    let id = match parse_object_id(&id) {
        Ok(id) => id,
        Err(_) => return Ok(not_found()),
    };
    match service.request_location(id).await {
        Ok(location) => Ok(Json(location).into_response()),
        Err(ServiceError::NotFound(_)) => {
            warn!(id = %id, "Quote request not found for location lookup");
            Ok(not_found())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn create_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Json(payload): Json<QuoteInput>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[create_quote_handler] Handler called");
    validate_payload(&payload)?;
    let view = service.create_quote(payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_quotes_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let (page, limit) = query.resolve();
    let quotes = service.list_quotes(page, limit).await?;
    Ok(Json(quotes))
}

pub async fn get_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    let view = service.get_quote(id).await?;
    Ok(Json(view))
}

pub async fn save_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<QuoteInput>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[save_quote_handler] Handler called");
    let id = parse_object_id(&id)?;
    validate_payload(&payload)?;
    let view = service.save_quote(id, payload).await?;
    Ok(Json(view))
}

pub async fn delete_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    service.delete_quote(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_quote_item_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<QuoteItemInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    validate_payload(&payload)?;
    let view = service.add_item(id, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn save_quote_item_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(item_id): Path<String>,
    Json(payload): Json<QuoteItemInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let item_id = parse_object_id(&item_id)?;
    validate_payload(&payload)?;
    let view = service.save_item(item_id, payload).await?;
    Ok(Json(view))
}

pub async fn remove_quote_item_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let item_id = parse_object_id(&item_id)?;
    let view = service.remove_item(item_id).await?;
    Ok(Json(view))
}

pub async fn resend_quote_email_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[resend_quote_email_handler] Handler called");
    let id = parse_object_id(&id)?;
    let quote = service.resend_quote_email(id).await?;
    Ok(Json(quote))
}
