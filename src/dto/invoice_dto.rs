use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::invoice::Invoice;
use crate::model::quote::QuoteTotals;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvoiceDto {
    #[validate(length(equal = 24))]
    pub quote_id: String,

    pub message: Option<String>,

    pub pay: Option<Decimal>,

    pub due_date: Option<NaiveDate>,

    #[validate(length(max = 255))]
    pub payment_term: Option<String>,

    pub is_paid: Option<bool>,
}

impl CreateInvoiceDto {
    pub fn into_parts(self) -> (String, InvoiceInput) {
        let fields = InvoiceInput {
            message: self.message,
            pay: self.pay,
            due_date: self.due_date,
            payment_term: self.payment_term,
            is_paid: self.is_paid,
        };
        (self.quote_id, fields)
    }
}

/// Editable invoice fields. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InvoiceInput {
    pub message: Option<String>,

    /// Amount received so far; must not be negative
    pub pay: Option<Decimal>,

    pub due_date: Option<NaiveDate>,

    #[validate(length(max = 255))]
    pub payment_term: Option<String>,

    pub is_paid: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub totals: QuoteTotals,
}
