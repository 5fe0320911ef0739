//! Vendor name recognition from the top of the receipt.

use super::LineRule;

/// Built-in vendor keyword table: lowercase keyword -> canonical name.
///
/// Keywords are matched case-insensitively; the first hit within the scan
/// window wins, so more specific keywords come first.
const KNOWN_VENDORS: &[(&str, &str)] = &[
    ("costco", "Costco Wholesale"),
    ("sam's club", "Sam's Club"),
    ("walmart", "Walmart"),
    ("wal-mart", "Walmart"),
    ("target", "Target"),
    ("kroger", "Kroger"),
    ("safeway", "Safeway"),
    ("albertsons", "Albertsons"),
    ("publix", "Publix"),
    ("aldi", "Aldi"),
    ("trader joe", "Trader Joe's"),
    ("whole foods", "Whole Foods Market"),
    ("walgreens", "Walgreens"),
    ("cvs", "CVS Pharmacy"),
    ("rite aid", "Rite Aid"),
    ("home depot", "The Home Depot"),
    ("lowe's", "Lowe's"),
    ("lowes", "Lowe's"),
    ("best buy", "Best Buy"),
    ("7-eleven", "7-Eleven"),
    ("dollar general", "Dollar General"),
    ("dollar tree", "Dollar Tree"),
];

/// Vendor recognition rule.
///
/// Scans only the first few lines; vendor names print at the top of a
/// receipt and scanning further produces false positives from item names.
pub struct VendorRule {
    scan_lines: usize,
    extra: Vec<(String, String)>,
}

impl VendorRule {
    pub fn new() -> Self {
        Self {
            scan_lines: 5,
            extra: Vec::new(),
        }
    }

    /// Override how many leading lines are scanned.
    pub fn with_scan_lines(mut self, scan_lines: usize) -> Self {
        self.scan_lines = scan_lines;
        self
    }

    /// Add extra keyword -> canonical name pairs, checked before the
    /// built-in table.
    pub fn with_extra_vendors(mut self, extra: Vec<(String, String)>) -> Self {
        self.extra = extra;
        self
    }
}

impl Default for VendorRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRule for VendorRule {
    type Output = String;

    fn apply(&self, lines: &[String]) -> Option<String> {
        for line in lines.iter().take(self.scan_lines) {
            let lower = line.to_lowercase();

            for (keyword, canonical) in &self.extra {
                if lower.contains(&keyword.to_lowercase()) {
                    return Some(canonical.clone());
                }
            }
            for (keyword, canonical) in KNOWN_VENDORS {
                if lower.contains(keyword) {
                    return Some((*canonical).to_string());
                }
            }
        }
        None
    }
}

/// Extract the canonical vendor name from the leading lines.
pub fn extract_vendor(lines: &[String]) -> Option<String> {
    VendorRule::new().apply(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recognizes_known_vendor_case_insensitively() {
        let lines = lines(&["COSTCO WHOLESALE", "123 Main St"]);
        assert_eq!(extract_vendor(&lines), Some("Costco Wholesale".to_string()));
    }

    #[test]
    fn only_scans_first_five_lines() {
        let lines = lines(&["a", "b", "c", "d", "e", "Walmart Supercenter"]);
        assert_eq!(extract_vendor(&lines), None);
    }

    #[test]
    fn unknown_vendor_yields_none() {
        let lines = lines(&["Joe's Corner Deli", "Receipt #1"]);
        assert_eq!(extract_vendor(&lines), None);
    }

    #[test]
    fn extra_vendors_take_precedence() {
        let rule = VendorRule::new()
            .with_extra_vendors(vec![("costco".to_string(), "Costco Business".to_string())]);
        let lines = lines(&["costco wholesale"]);
        assert_eq!(rule.apply(&lines), Some("Costco Business".to_string()));
    }
}
