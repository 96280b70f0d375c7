use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::catalog_handler::list_services_handler;
use crate::handler::contact_handler::{open_contact_handler, submit_contact_handler, unread_count_handler};
use crate::handler::template_handler::{create_template_handler, list_templates_handler, update_template_handler};
use crate::service::catalog_service::CatalogServiceImpl;
use crate::service::contact_service::ContactServiceImpl;
use crate::service::template_service::TemplateServiceImpl;

pub fn catalog_router(service: Arc<CatalogServiceImpl>) -> Router {
    Router::new()
        .route("/services", get(list_services_handler))
        .with_state(service)
}

pub fn template_router(service: Arc<TemplateServiceImpl>) -> Router {
    Router::new()
        .route("/email-templates", get(list_templates_handler).post(create_template_handler))
        .route("/email-templates/{id}", put(update_template_handler))
        .with_state(service)
}

pub fn contact_router(service: Arc<ContactServiceImpl>) -> Router {
    Router::new()
        .route("/contacts", post(submit_contact_handler))
        .route("/contacts/unread-count", get(unread_count_handler))
        .route("/contacts/{id}", get(open_contact_handler))
        .with_state(service)
}
