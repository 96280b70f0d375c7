use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::status::QuoteStatus;

/// Customer-submitted ask for service, before pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub services: Vec<ObjectId>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: QuoteStatus,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl QuoteRequest {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        QuoteRequest {
            id: None,
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            services: Vec::new(),
            city: None,
            postal_code: None,
            address: None,
            message: String::new(),
            status: QuoteStatus::Pending,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn location(&self) -> RequestLocation {
        RequestLocation {
            city: self.city.clone().unwrap_or_default(),
            postal_code: self.postal_code.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            found: true,
        }
    }
}

/// Location fields used to pre-fill a quote from its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestLocation {
    pub city: String,
    pub postal_code: String,
    pub address: String,
    pub found: bool,
}

impl RequestLocation {
    pub fn not_found() -> Self {
        RequestLocation::default()
    }
}
