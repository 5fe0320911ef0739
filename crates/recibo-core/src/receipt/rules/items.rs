//! Line item extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::receipt::LineItem;

use super::patterns::TRAILING_ITEM;
use super::LineRule;

/// Line item rule: any line ending in `<text> <price>` is a purchased item.
///
/// Totals lines also end in a price, so lines that classify as
/// subtotal/tax/total are excluded. False negatives are expected; this is a
/// heuristic, not a guarantee.
pub struct ItemsRule;

impl ItemsRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ItemsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRule for ItemsRule {
    type Output = Vec<LineItem>;

    fn apply(&self, lines: &[String]) -> Option<Vec<LineItem>> {
        let mut items = Vec::new();

        for line in lines {
            let lower = line.to_lowercase();
            if lower.contains("subtotal") || lower.contains("total") || lower.contains("tax") {
                continue;
            }

            let Some(caps) = TRAILING_ITEM.captures(line) else {
                continue;
            };
            let Ok(price) = Decimal::from_str(&caps[2]) else {
                continue;
            };

            items.push(LineItem::new(caps[1].trim(), price));
        }

        (!items.is_empty()).then_some(items)
    }
}

/// Extract purchased items in document order.
pub fn extract_items(lines: &[String]) -> Vec<LineItem> {
    ItemsRule::new().apply(lines).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn trailing_price_becomes_an_item() {
        let items = extract_items(&lines(&["Kirkland Paper Towels   19.99"]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Kirkland Paper Towels");
        assert_eq!(items[0].unit_price, dec("19.99"));
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn totals_lines_are_not_items() {
        let items = extract_items(&lines(&[
            "Bananas 1.29",
            "Subtotal  19.99",
            "Tax  1.65",
            "Total  21.64",
        ]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Bananas");
    }

    #[test]
    fn lines_without_trailing_price_are_skipped() {
        let items = extract_items(&lines(&[
            "COSTCO WHOLESALE",
            "07/10/2025",
            "Thank you for shopping",
        ]));
        assert!(items.is_empty());
    }

    #[test]
    fn items_keep_document_order() {
        let items = extract_items(&lines(&["Milk 3.49", "Bread 2.99"]));
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
    }
}
