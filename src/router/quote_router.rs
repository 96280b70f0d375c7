use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::invoice_handler::{
    create_invoice_handler, get_invoice_handler, list_invoices_handler, save_invoice_handler,
    send_invoice_email_handler,
};
use crate::handler::quote_handler::{
    add_quote_item_handler, create_quote_handler, delete_quote_handler, get_quote_handler,
    get_quote_request_handler, list_quote_requests_handler, list_quotes_handler,
    quote_request_location_handler, remove_quote_item_handler, resend_quote_email_handler,
    save_quote_handler, save_quote_item_handler, submit_quote_request_handler,
};
use crate::service::quote_service::QuoteServiceImpl;

pub fn quote_router(service: Arc<QuoteServiceImpl>) -> Router {
    let requests = Router::new()
        .route(
            "/quote-requests",
            post(submit_quote_request_handler).get(list_quote_requests_handler),
        )
        .route("/quote-requests/{id}", get(get_quote_request_handler))
        .route("/quote-requests/{id}/location", get(quote_request_location_handler));

    let quotes = Router::new()
        .route("/quotes", post(create_quote_handler).get(list_quotes_handler))
        .route(
            "/quotes/{id}",
            get(get_quote_handler).put(save_quote_handler).delete(delete_quote_handler),
        )
        .route("/quotes/{id}/items", post(add_quote_item_handler))
        .route(
            "/quotes/items/{item_id}",
            put(save_quote_item_handler).delete(remove_quote_item_handler),
        )
        .route("/quotes/{id}/resend", post(resend_quote_email_handler));

    let invoices = Router::new()
        .route("/invoices", post(create_invoice_handler).get(list_invoices_handler))
        .route("/invoices/{id}", get(get_invoice_handler).put(save_invoice_handler))
        .route("/invoices/{id}/send", post(send_invoice_email_handler));

    requests.merge(quotes).merge(invoices).with_state(service)
}
