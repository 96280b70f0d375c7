use serde::{Deserialize, Serialize};
use std::fmt;

/// Status shared by quote requests and quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Replied,
    Rejected,
    Approved,
    Cancelled,
    Completed,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Replied => "replied",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Cancelled => "cancelled",
            QuoteStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Shortlist,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlist => "shortlist",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_status_serializes_lowercase() {
        let json = serde_json::to_string(&QuoteStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let parsed: QuoteStatus = serde_json::from_str("\"replied\"").unwrap();
        assert_eq!(parsed, QuoteStatus::Replied);
    }

    #[test]
    fn test_default_statuses_are_pending() {
        assert_eq!(QuoteStatus::default(), QuoteStatus::Pending);
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Pending);
    }
}
