use bson::oid::ObjectId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::quote::{currency, QuoteTotals};

/// Billing document issued once a quote is completed. At most one per quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Opaque document number, assigned once on first save
    pub invoice_id: Option<String>,
    /// Database id of the invoiced quote
    pub quote_id: ObjectId,
    pub message: Option<String>,
    /// Generated PDF, relative to the media root
    pub invoice_file: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_sent: bool,
    #[serde(default)]
    pub pay: Decimal,
    #[serde(default)]
    pub due: Decimal,
    pub due_date: Option<NaiveDate>,
    /// e.g. "Due within 3 days", "Due on receipt"
    pub payment_term: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Invoice {
    pub fn for_quote(quote_id: ObjectId) -> Self {
        Invoice {
            id: None,
            invoice_id: None,
            quote_id,
            message: None,
            invoice_file: None,
            is_paid: false,
            is_sent: false,
            pay: Decimal::ZERO,
            due: Decimal::ZERO,
            due_date: None,
            payment_term: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Outstanding amount against the quote's tax-inclusive total.
    pub fn recompute_due(&mut self, totals: &QuoteTotals) {
        self.due = currency(if self.pay.is_zero() {
            totals.total_with_gst
        } else {
            totals.total_with_gst - self.pay
        });
    }
}
