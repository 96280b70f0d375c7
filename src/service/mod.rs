pub mod career_service;
pub mod catalog_service;
pub mod contact_service;
pub mod lifecycle;
pub mod quote_service;
pub mod template_service;

use bson::oid::ObjectId;

use crate::util::error::ServiceError;

/// Parses a hex id carried inside a request body.
pub fn parse_object_id(value: &str, field: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| ServiceError::InvalidInput(format!("Invalid {}: {}", field, value)))
}
