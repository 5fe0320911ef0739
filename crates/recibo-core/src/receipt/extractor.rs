//! Receipt field extractor running the ordered rule cascade.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::{ExtractedText, ParsedReceipt, UNKNOWN_VENDOR};

use super::rules::{
    amounts::TotalsRule, dates::DateRule, items::ItemsRule, number::NumberRule,
    vendor::VendorRule, LineRule,
};

/// Heuristic field extractor.
///
/// Extraction is a total function: absent fields default, it never fails.
/// A downstream reviewer is expected to correct what the heuristics miss.
pub struct ReceiptExtractor {
    vendor: VendorRule,
    date: DateRule,
    number: NumberRule,
    totals: TotalsRule,
    items: ItemsRule,
}

impl ReceiptExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::with_config(&ExtractionConfig::default())
    }

    /// Create an extractor from configuration.
    pub fn with_config(config: &ExtractionConfig) -> Self {
        Self {
            vendor: VendorRule::new()
                .with_scan_lines(config.vendor_scan_lines)
                .with_extra_vendors(config.extra_vendors.clone()),
            date: DateRule::new(),
            number: NumberRule::new(),
            totals: TotalsRule::new(),
            items: ItemsRule::new(),
        }
    }

    /// Recover structured purchase data from text lines.
    pub fn extract(&self, text: &ExtractedText) -> ParsedReceipt {
        let lines = text.lines();
        let mut parsed = ParsedReceipt::new();

        if let Some(vendor) = self.vendor.apply(lines) {
            parsed.vendor_name = vendor;
        }
        parsed.transaction_date = self.date.apply(lines);
        parsed.receipt_number = self.number.apply(lines);

        if let Some(totals) = self.totals.apply(lines) {
            parsed.subtotal = totals.subtotal.unwrap_or_default();
            parsed.tax = totals.tax.unwrap_or_default();
            parsed.total = totals.total.unwrap_or_default();
        }

        parsed.line_items = self.items.apply(lines).unwrap_or_default();

        debug!(
            vendor = %parsed.vendor_name,
            items = parsed.line_items.len(),
            has_number = parsed.receipt_number.is_some(),
            "extracted receipt fields"
        );

        parsed
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn text(raw: &[&str]) -> ExtractedText {
        ExtractedText::from_lines(raw.iter().map(|s| s.to_string()).collect())
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn clean_receipt_extracts_every_field() {
        let parsed = ReceiptExtractor::new().extract(&text(&[
            "COSTCO WHOLESALE",
            "07/10/2025",
            "Receipt #123456",
            "Kirkland Paper Towels   19.99",
            "Subtotal  19.99",
            "Tax  1.65",
            "Total  21.64",
        ]));

        assert_eq!(parsed.vendor_name, "Costco Wholesale");
        assert_eq!(
            parsed.transaction_date,
            Some(NaiveDate::from_ymd_opt(2025, 7, 10).unwrap())
        );
        assert_eq!(parsed.receipt_number, Some("123456".to_string()));
        assert_eq!(parsed.subtotal, dec("19.99"));
        assert_eq!(parsed.tax, dec("1.65"));
        assert_eq!(parsed.total, dec("21.64"));

        assert_eq!(parsed.line_items.len(), 1);
        assert_eq!(parsed.line_items[0].name, "Kirkland Paper Towels");
        assert_eq!(parsed.line_items[0].unit_price, dec("19.99"));
        assert_eq!(parsed.line_items[0].quantity, 1);
    }

    #[test]
    fn missing_date_stays_absent() {
        let parsed = ReceiptExtractor::new().extract(&text(&[
            "Joe's Corner Deli",
            "Sandwich 8.50",
            "Total 8.50",
        ]));
        assert_eq!(parsed.transaction_date, None);
    }

    #[test]
    fn unknown_vendor_uses_sentinel() {
        let parsed = ReceiptExtractor::new().extract(&text(&["Joe's Corner Deli"]));
        assert_eq!(parsed.vendor_name, UNKNOWN_VENDOR);
    }

    #[test]
    fn totals_prefer_matches_nearest_the_end() {
        let parsed = ReceiptExtractor::new().extract(&text(&[
            "Subtotal: 10.00",
            "Total: 12.00",
            "Total Due: 12.50",
        ]));
        assert_eq!(parsed.subtotal, dec("10.00"));
        assert_eq!(parsed.total, dec("12.50"));
    }

    #[test]
    fn empty_text_extracts_all_defaults() {
        let parsed = ReceiptExtractor::new().extract(&ExtractedText::from_lines(vec![]));
        assert_eq!(parsed, ParsedReceipt::default());
    }
}
