use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of outbound notification a template is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Acknowledgement of a new quote request
    Init,
    Quote,
    Invoice,
    Shortlist,
    Selected,
    Rejected,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Init => "init",
            MessageType::Quote => "quote",
            MessageType::Invoice => "invoice",
            MessageType::Shortlist => "shortlist",
            MessageType::Selected => "selected",
            MessageType::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored subject/body pair for one category of notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessageTemplate {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub message_type: MessageType,
    pub subject: String,
    pub body: String,
    pub is_active: bool,
}

impl EmailMessageTemplate {
    pub fn new(message_type: MessageType, subject: impl Into<String>, body: impl Into<String>) -> Self {
        EmailMessageTemplate {
            id: None,
            message_type,
            subject: subject.into(),
            body: body.into(),
            is_active: true,
        }
    }
}
