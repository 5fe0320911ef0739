//! Totals extraction: subtotal, tax, and total.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT;
use super::LineRule;

/// Monetary totals recovered from a receipt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptTotals {
    pub subtotal: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total: Option<Decimal>,
}

impl ReceiptTotals {
    fn is_complete(&self) -> bool {
        self.subtotal.is_some() && self.tax.is_some() && self.total.is_some()
    }
}

/// Totals rule.
///
/// Scans lines in reverse: totals print at the bottom of a receipt, so the
/// match closest to the end of the document is the authoritative one. Each
/// bucket keeps the first match found while scanning bottom-up.
pub struct TotalsRule;

impl TotalsRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TotalsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRule for TotalsRule {
    type Output = ReceiptTotals;

    fn apply(&self, lines: &[String]) -> Option<ReceiptTotals> {
        let mut totals = ReceiptTotals::default();

        for line in lines.iter().rev() {
            let lower = line.to_lowercase();
            let is_subtotal = lower.contains("subtotal");
            let is_total = lower.contains("total") && !is_subtotal;
            let is_tax = lower.contains("tax");

            if !(is_subtotal || is_total || is_tax) {
                continue;
            }
            let Some(amount) = first_amount(line) else {
                continue;
            };

            if is_total && totals.total.is_none() {
                totals.total = Some(amount);
            }
            if is_subtotal && totals.subtotal.is_none() {
                totals.subtotal = Some(amount);
            }
            if is_tax && totals.tax.is_none() {
                totals.tax = Some(amount);
            }
            if totals.is_complete() {
                break;
            }
        }

        (totals != ReceiptTotals::default()).then_some(totals)
    }
}

/// The first two-decimal amount on a line, if it parses as a finite decimal.
pub fn first_amount(line: &str) -> Option<Decimal> {
    AMOUNT
        .captures(line)
        .and_then(|caps| Decimal::from_str(&caps[1]).ok())
}

/// Extract receipt totals via the bottom-up scan.
pub fn extract_totals(lines: &[String]) -> ReceiptTotals {
    TotalsRule::new().apply(lines).unwrap_or_default()
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
    fn classifies_all_three_buckets() {
        let totals = extract_totals(&lines(&[
            "Subtotal  19.99",
            "Tax  1.65",
            "Total  21.64",
        ]));
        assert_eq!(totals.subtotal, Some(dec("19.99")));
        assert_eq!(totals.tax, Some(dec("1.65")));
        assert_eq!(totals.total, Some(dec("21.64")));
    }

    #[test]
    fn subtotal_line_is_not_a_total() {
        let totals = extract_totals(&lines(&["Subtotal 10.00"]));
        assert_eq!(totals.subtotal, Some(dec("10.00")));
        assert_eq!(totals.total, None);
    }

    #[test]
    fn duplicate_total_lines_keep_the_one_nearest_the_end() {
        let totals = extract_totals(&lines(&[
            "Subtotal: 10.00",
            "Total: 12.00",
            "Total Due: 12.50",
        ]));
        assert_eq!(totals.total, Some(dec("12.50")));
        assert_eq!(totals.subtotal, Some(dec("10.00")));
    }

    #[test]
    fn keyword_line_without_amount_is_ignored() {
        let totals = extract_totals(&lines(&["Total savings today!", "Total 8.00"]));
        assert_eq!(totals.total, Some(dec("8.00")));
    }

    #[test]
    fn no_keyword_lines_yield_empty_totals() {
        let totals = extract_totals(&lines(&["Milk 3.49", "Bread 2.99"]));
        assert_eq!(totals, ReceiptTotals::default());
    }
}
