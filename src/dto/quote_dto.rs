use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::model::invoice::Invoice;
use crate::model::quote::{Quote, QuoteItem, QuoteTotals};
use crate::model::status::QuoteStatus;

const DEFAULT_PAGE_LIMIT: u32 = 20;
const MAX_PAGE_LIMIT: u32 = 100;

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// 1-based page and a limit clamped to `1..=100`.
    pub fn resolve(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        (page, limit)
    }
}

/// Public intake form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuoteRequestDto {
    #[validate(length(min = 2, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub phone: String,

    /// Hex ids of requested services
    #[serde(default)]
    pub services: Vec<String>,

    #[validate(length(max = 255))]
    pub city: Option<String>,

    #[validate(length(max = 20))]
    pub postal_code: Option<String>,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    #[serde(default)]
    pub message: String,
}

/// Body of `POST /quotes` and `PUT /quotes/{id}`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QuoteInput {
    #[validate(length(equal = 24))]
    pub quote_request_id: Option<String>,

    #[validate(length(equal = 24))]
    pub company_id: Option<String>,

    pub status: Option<QuoteStatus>,

    #[validate(length(max = 255))]
    pub city: Option<String>,

    #[validate(length(max = 20))]
    pub postal_code: Option<String>,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    pub expiry_date: Option<NaiveDate>,

    #[validate(length(max = 255))]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuoteItemInput {
    #[validate(length(equal = 24))]
    pub service_id: String,

    #[validate(range(min = 1))]
    pub quantity: u32,

    #[validate(custom(function = "non_negative"))]
    pub rate: Decimal,
}

/// Quote with its line items and derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteView {
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
    pub totals: QuoteTotals,
    pub invoice: Option<Invoice>,
}
