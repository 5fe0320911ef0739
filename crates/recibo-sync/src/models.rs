//! Persisted receipt entities.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use recibo_core::models::receipt::LineItem;

/// Processing status of a persisted receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Ingested locally, not yet confirmed by the remote store.
    Pending,
    /// Remote store parsed and accepted the receipt.
    Completed,
    /// Remote store could not parse the receipt.
    Failed,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Completed => "completed",
            ReceiptStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReceiptStatus::Pending),
            "completed" => Some(ReceiptStatus::Completed),
            "failed" => Some(ReceiptStatus::Failed),
            _ => None,
        }
    }
}

/// A receipt as persisted in the local store.
///
/// Line items are owned children: deleting the record cascades to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Local surrogate identifier (SQLite rowid).
    pub id: i64,

    /// Business key; unique among non-NULL values, used for dedup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,

    /// Canonical vendor name.
    pub vendor_name: String,

    /// Store location, distinct from the vendor name.
    pub store_location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,

    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,

    pub status: ReceiptStatus,

    /// Free-text user notes; never overwritten by reconciliation.
    pub notes: String,

    /// Subtotal most recently sent to the server for this record.
    /// Reconciliation compares the remote echo against this, not against
    /// the current local value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_subtotal: Option<Decimal>,

    /// Original document bytes, retained for re-processing.
    #[serde(skip)]
    pub raw_document: Option<Vec<u8>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Owned line items in document order.
    pub line_items: Vec<LineItem>,
}

/// Field set for inserting a new receipt record.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub receipt_number: Option<String>,
    pub vendor_name: String,
    pub store_location: String,
    pub transaction_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: ReceiptStatus,
    pub notes: String,
    pub last_sent_subtotal: Option<Decimal>,
    pub raw_document: Option<Vec<u8>>,
    pub line_items: Vec<LineItem>,
}

impl NewReceipt {
    /// A freshly parsed, locally ingested receipt (status pending).
    pub fn from_parse(
        parsed: &recibo_core::ParsedReceipt,
        raw_document: Option<&[u8]>,
    ) -> Self {
        Self {
            receipt_number: parsed.receipt_number.clone(),
            vendor_name: parsed.vendor_name.clone(),
            store_location: String::new(),
            transaction_date: parsed.transaction_date,
            subtotal: parsed.subtotal,
            tax: parsed.tax,
            total: parsed.total,
            status: ReceiptStatus::Pending,
            notes: String::new(),
            last_sent_subtotal: None,
            raw_document: raw_document.map(|d| d.to_vec()),
            line_items: parsed.line_items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ReceiptStatus::Pending,
            ReceiptStatus::Completed,
            ReceiptStatus::Failed,
        ] {
            assert_eq!(ReceiptStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReceiptStatus::parse("bogus"), None);
    }

    #[test]
    fn from_parse_starts_pending_with_no_snapshot() {
        let parsed = recibo_core::ParsedReceipt::default();
        let new = NewReceipt::from_parse(&parsed, Some(b"bytes"));
        assert_eq!(new.status, ReceiptStatus::Pending);
        assert!(new.last_sent_subtotal.is_none());
        assert_eq!(new.raw_document.as_deref(), Some(b"bytes".as_slice()));
    }
}
