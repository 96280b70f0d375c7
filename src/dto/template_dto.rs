use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::email_template::{EmailMessageTemplate, MessageType};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TemplateInput {
    pub message_type: MessageType,

    #[validate(length(min = 1, max = 255))]
    pub subject: String,

    #[validate(length(min = 1))]
    pub body: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<TemplateInput> for EmailMessageTemplate {
    fn from(input: TemplateInput) -> Self {
        let mut template = EmailMessageTemplate::new(input.message_type, input.subject, input.body);
        template.is_active = input.is_active;
        template
    }
}
