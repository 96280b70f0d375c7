use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::dto::career_dto::{ApplicationInput, ApplicationStatusInput, VacancyInput};
use crate::handler::{parse_object_id, validate_payload};
use crate::service::career_service::{CareerService, CareerServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_vacancies_handler(
    State(service): State<Arc<CareerServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let vacancies = service.list_open_vacancies().await?;
    Ok(Json(vacancies))
}

pub async fn create_vacancy_handler(
    State(service): State<Arc<CareerServiceImpl>>,
    Json(payload): Json<VacancyInput>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let vacancy = service.create_vacancy(payload).await?;
    Ok((StatusCode::CREATED, Json(vacancy)))
}

pub async fn apply_handler(
    State(service): State<Arc<CareerServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<ApplicationInput>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[apply_handler] Handler called");
    let id = parse_object_id(&id)?;
    validate_payload(&payload)?;
    let application = service.apply(id, payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn update_application_status_handler(
    State(service): State<Arc<CareerServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<ApplicationStatusInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id)?;
    validate_payload(&payload)?;
    let application = service.update_application_status(id, payload).await?;
    Ok(Json(application))
}
