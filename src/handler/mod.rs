pub mod career_handler;
pub mod catalog_handler;
pub mod contact_handler;
pub mod invoice_handler;
pub mod quote_handler;
pub mod template_handler;

use bson::oid::ObjectId;
use tracing::error;
use validator::Validate;

use crate::util::error::HandlerError;

/// Path ids are 24-char hex ObjectIds.
pub fn parse_object_id(id: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(id).map_err(|_| {
        error!(id, "Invalid id in path");
        HandlerError::bad_request(format!("Invalid id: {}", id))
    })
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), HandlerError> {
    payload.validate().map_err(|e| {
        error!("Validation failed: {}", e);
        HandlerError::validation(e)
    })
}
