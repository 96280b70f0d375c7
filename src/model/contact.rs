use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Inbound message from the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<String>,
}

impl Contact {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name.as_deref().unwrap_or(""))
            .trim()
            .to_string()
    }
}
