use bson::oid::ObjectId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::status::QuoteStatus;

/// GST applied to every quote and invoice (10%).
pub fn gst_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Two decimal places when that loses nothing, so `220.0000` reads as `220.00`.
/// Sub-cent values are kept exact.
pub fn currency(value: Decimal) -> Decimal {
    let cents = value.round_dp(2);
    if cents == value {
        cents
    } else {
        value
    }
}

/// Priced response to a quote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub company_id: Option<ObjectId>,
    pub quote_request_id: Option<ObjectId>,
    /// Opaque document number, assigned once on first save
    pub quote_id: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub status: QuoteStatus,
    #[serde(default)]
    pub mail_sent: bool,
    pub expiry_date: Option<NaiveDate>,
    pub reference: Option<String>,
    /// Generated PDF, relative to the media root
    pub quotation_file: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for Quote {
    fn default() -> Self {
        Quote {
            id: None,
            company_id: None,
            quote_request_id: None,
            quote_id: None,
            city: None,
            postal_code: None,
            address: None,
            status: QuoteStatus::Pending,
            mail_sent: false,
            expiry_date: None,
            reference: None,
            quotation_file: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// One priced line of a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Database id of the owning quote
    pub quote_id: ObjectId,
    pub service_id: ObjectId,
    pub quantity: u32,
    pub rate: Decimal,
    #[serde(default)]
    pub amount: Decimal,
}

impl QuoteItem {
    pub fn new(quote_id: ObjectId, service_id: ObjectId, quantity: u32, rate: Decimal) -> Self {
        let mut item = QuoteItem {
            id: None,
            quote_id,
            service_id,
            quantity,
            rate,
            amount: Decimal::ZERO,
        };
        item.recompute_amount();
        item
    }

    pub fn recompute_amount(&mut self) {
        self.amount = Decimal::from(self.quantity) * self.rate;
    }
}

/// Derived money values of a quote. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub total: Decimal,
    pub gst_amount: Decimal,
    pub total_with_gst: Decimal,
}

impl QuoteTotals {
    pub fn from_items(items: &[QuoteItem]) -> Self {
        let total: Decimal = items.iter().map(|item| item.amount).sum();
        let gst_amount = total * gst_rate();
        QuoteTotals {
            total: currency(total),
            gst_amount: currency(gst_amount),
            total_with_gst: currency(total + gst_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32, rate: Decimal) -> QuoteItem {
        QuoteItem::new(ObjectId::new(), ObjectId::new(), quantity, rate)
    }

    #[test]
    fn test_amount_is_quantity_times_rate() {
        let line = item(3, Decimal::new(4550, 2));
        assert_eq!(line.amount, Decimal::new(13650, 2));
    }

    #[test]
    fn test_totals_with_gst() {
        let totals = QuoteTotals::from_items(&[item(2, Decimal::new(10000, 2))]);
        assert_eq!(totals.total, Decimal::new(20000, 2));
        assert_eq!(totals.gst_amount, Decimal::new(2000, 2));
        assert_eq!(totals.total_with_gst, Decimal::new(22000, 2));
    }

    #[test]
    fn test_totals_are_exact_for_cents() {
        // 0.1 + 0.2 style sums must not drift
        let totals = QuoteTotals::from_items(&[
            item(1, Decimal::new(10, 2)),
            item(1, Decimal::new(20, 2)),
            item(3, Decimal::new(33, 2)),
        ]);
        assert_eq!(totals.total, Decimal::new(129, 2));
        assert_eq!(totals.gst_amount, Decimal::new(129, 3));
        assert_eq!(totals.total_with_gst, Decimal::new(1419, 3));
        assert_eq!(totals.total_with_gst, totals.total * Decimal::new(110, 2));
    }

    #[test]
    fn test_totals_serialize_as_cents() {
        let totals = QuoteTotals::from_items(&[item(2, Decimal::new(10000, 2))]);
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["gst_amount"], "20.00");
        assert_eq!(json["total_with_gst"], "220.00");
    }

    #[test]
    fn test_currency_keeps_sub_cent_values() {
        assert_eq!(currency(Decimal::new(2200000, 4)).to_string(), "220.00");
        assert_eq!(currency(Decimal::new(129, 3)).to_string(), "0.129");
        assert_eq!(currency(Decimal::new(5, 0)).to_string(), "5");
    }

    #[test]
    fn test_empty_quote_totals_are_zero() {
        let totals = QuoteTotals::from_items(&[]);
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.total_with_gst, Decimal::ZERO);
    }

    #[test]
    fn test_recompute_after_quantity_change() {
        let mut line = item(1, Decimal::new(5000, 2));
        line.quantity = 4;
        line.recompute_amount();
        assert_eq!(line.amount, Decimal::new(20000, 2));
    }
}
