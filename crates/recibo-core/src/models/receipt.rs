//! Receipt data models shared across the ingestion pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel vendor name used when no known vendor is recognized.
pub const UNKNOWN_VENDOR: &str = "Unknown Store";

/// Format hint for an acquired document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentHint {
    /// Document is expected to carry machine-encoded text.
    Text,
    /// Document is a scan or photo; text must come from OCR.
    Image,
    /// Nothing known up front; probe for text first.
    Unknown,
}

impl Default for DocumentHint {
    fn default() -> Self {
        Self::Unknown
    }
}

/// An opaque document payload handed to the acquirer.
///
/// Immutable once constructed; the bytes are retained on the persisted
/// record so a receipt can be re-processed later.
#[derive(Debug, Clone)]
pub struct RawDocument {
    data: Vec<u8>,
    hint: DocumentHint,
}

impl RawDocument {
    pub fn new(data: Vec<u8>, hint: DocumentHint) -> Self {
        Self { data, hint }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn hint(&self) -> DocumentHint {
        self.hint
    }
}

/// Ordered text lines produced once per document.
///
/// Never mutated after creation; the extractor only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    lines: Vec<String>,
}

impl ExtractedText {
    /// Build from a block of text, splitting on line breaks.
    ///
    /// Carriage returns are stripped; blank lines are dropped since no
    /// heuristic consumes them.
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .filter(|l| !l.trim().is_empty())
            .collect();
        Self { lines }
    }

    /// Build from already-separated lines (e.g. one per OCR text box).
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into_iter().filter(|l| !l.trim().is_empty()).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A single purchased item recovered from a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name as printed on the receipt.
    pub name: String,

    /// Unit price.
    pub unit_price: Decimal,

    /// Quantity purchased; defaults to 1 when not discernible.
    pub quantity: i64,

    /// Product code (SKU, PLU, barcode) when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,

    /// Spending category; never filled in by extraction or sync, reserved
    /// for downstream classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity: 1,
            item_code: None,
            category: None,
        }
    }
}

/// Structured purchase data recovered from one receipt document.
///
/// Every field degrades to a default when the heuristics find nothing;
/// extraction itself never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    /// Canonical vendor name, or [`UNKNOWN_VENDOR`].
    pub vendor_name: String,

    /// Transaction date when a date pattern was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,

    /// Business key used for dedup against the remote store. Absence is
    /// legal but disables dedup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,

    /// Pre-tax subtotal.
    pub subtotal: Decimal,

    /// Tax amount.
    pub tax: Decimal,

    /// Grand total.
    pub total: Decimal,

    /// Purchased items in document order.
    pub line_items: Vec<LineItem>,
}

impl ParsedReceipt {
    pub fn new() -> Self {
        Self {
            vendor_name: UNKNOWN_VENDOR.to_string(),
            transaction_date: None,
            receipt_number: None,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            line_items: Vec::new(),
        }
    }
}

impl Default for ParsedReceipt {
    fn default() -> Self {
        Self::new()
    }
}
