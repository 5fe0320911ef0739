//! Wire-level receipt representations.
//!
//! The remote store speaks decimal-formatted strings and ISO-8601 dates.
//! These types are never handed to the presentation layer; they always pass
//! through the reconciliation engine first.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A receipt as returned by the remote store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteReceipt {
    /// Business key; records without one cannot be deduplicated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_location: Option<String>,

    /// ISO-8601 date or datetime string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,

    /// Decimal-formatted amount strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,

    /// Whether the remote pipeline parsed the receipt successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_successfully: Option<bool>,

    #[serde(default)]
    pub items: Vec<RemoteLineItem>,
}

/// A line item on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteLineItem {
    pub description: String,

    /// Decimal-formatted price string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
}

impl RemoteReceipt {
    /// Subtotal amount; unparseable or absent values default to zero.
    pub fn subtotal_amount(&self) -> Decimal {
        parse_amount(self.subtotal.as_deref())
    }

    /// Tax amount; unparseable or absent values default to zero.
    pub fn tax_amount(&self) -> Decimal {
        parse_amount(self.tax.as_deref())
    }

    /// Total amount; unparseable or absent values default to zero.
    pub fn total_amount(&self) -> Decimal {
        parse_amount(self.total.as_deref())
    }

    /// Transaction date; unparseable or absent values are `None`.
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.transaction_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| NaiveDate::from_str(raw).ok())
    }
}

impl RemoteLineItem {
    /// Unit price; unparseable or absent values default to zero.
    pub fn price_amount(&self) -> Decimal {
        parse_amount(self.price.as_deref())
    }

    /// Quantity, floored at 1.
    pub fn quantity_or_default(&self) -> i64 {
        self.quantity.filter(|&q| q >= 1).unwrap_or(1)
    }
}

/// Fields pushed to the remote store when propagating a local edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn parse_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| Decimal::from_str(s.trim()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn amounts_parse_from_decimal_strings() {
        let remote = RemoteReceipt {
            subtotal: Some("19.99".to_string()),
            tax: Some(" 1.65 ".to_string()),
            ..Default::default()
        };
        assert_eq!(remote.subtotal_amount(), Decimal::new(1999, 2));
        assert_eq!(remote.tax_amount(), Decimal::new(165, 2));
    }

    #[test]
    fn bad_amounts_default_to_zero() {
        let remote = RemoteReceipt {
            subtotal: Some("not-a-number".to_string()),
            ..Default::default()
        };
        assert_eq!(remote.subtotal_amount(), Decimal::ZERO);
        assert_eq!(remote.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn dates_accept_date_and_datetime_forms() {
        let date_only = RemoteReceipt {
            transaction_date: Some("2025-07-10".to_string()),
            ..Default::default()
        };
        let with_time = RemoteReceipt {
            transaction_date: Some("2025-07-10T14:30:00Z".to_string()),
            ..Default::default()
        };
        let garbled = RemoteReceipt {
            transaction_date: Some("July 10th".to_string()),
            ..Default::default()
        };

        let expected = NaiveDate::from_ymd_opt(2025, 7, 10);
        assert_eq!(date_only.date(), expected);
        assert_eq!(with_time.date(), expected);
        assert_eq!(garbled.date(), None);
    }

    #[test]
    fn quantity_floors_at_one() {
        let item = RemoteLineItem {
            quantity: Some(0),
            ..Default::default()
        };
        assert_eq!(item.quantity_or_default(), 1);

        let item = RemoteLineItem {
            quantity: Some(3),
            ..Default::default()
        };
        assert_eq!(item.quantity_or_default(), 3);
    }

    #[test]
    fn unknown_wire_fields_are_ignored() {
        let remote: RemoteReceipt = serde_json::from_str(
            r#"{"transaction_number": "123", "server_revision": 9}"#,
        )
        .unwrap();
        assert_eq!(remote.transaction_number.as_deref(), Some("123"));
    }
}
