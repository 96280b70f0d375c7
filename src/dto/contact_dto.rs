use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::contact::Contact;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,

    #[validate(length(max = 255))]
    pub last_name: Option<String>,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 255))]
    pub phone: Option<String>,

    #[validate(length(max = 255))]
    pub subject: Option<String>,

    pub message: Option<String>,
}

impl From<ContactInput> for Contact {
    fn from(input: ContactInput) -> Self {
        Contact {
            id: None,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            subject: input.subject,
            message: input.message,
            is_read: false,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread: u64,
}
