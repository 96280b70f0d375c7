use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::dto::invoice_dto::{CreateInvoiceDto, InvoiceInput};
use crate::dto::quote_dto::PageQuery;
use crate::handler::{parse_object_id, validate_payload};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::util::error::HandlerError;

pub async fn create_invoice_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Json(payload): Json<CreateInvoiceDto>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[create_invoice_handler] Handler called");
    validate_payload(&payload)?;
    let (quote_id, input) = payload.into_parts();
    let quote_id = parse_object_id(&quote_id)?;
    let view = service.create_invoice(quote_id, input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_invoices_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let (page, limit) = query.resolve();
    let invoices = service.list_invoices(page, limit).await?;
    Ok(Json(invoices))
}

pub async fn get_invoice_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    let view = service.get_invoice(id).await?;
    Ok(Json(view))
}

pub async fn save_invoice_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<InvoiceInput>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[save_invoice_handler] Handler called");
    let id = parse_object_id(&id)?;
    validate_payload(&payload)?;
    let view = service.save_invoice(id, payload).await?;
    Ok(Json(view))
}

pub async fn send_invoice_email_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[send_invoice_email_handler] Handler called");
    let id = parse_object_id(&id)?;
    let invoice = service.send_invoice_email(id).await?;
    Ok(Json(invoice))
}
