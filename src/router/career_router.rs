use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::career_handler::{
    apply_handler, create_vacancy_handler, list_vacancies_handler, update_application_status_handler,
};
use crate::service::career_service::CareerServiceImpl;

pub fn career_router(service: Arc<CareerServiceImpl>) -> Router {
    Router::new()
        .route("/vacancies", get(list_vacancies_handler).post(create_vacancy_handler))
        .route("/vacancies/{id}/applications", post(apply_handler))
        .route("/applications/{id}/status", put(update_application_status_handler))
        .with_state(service)
}
