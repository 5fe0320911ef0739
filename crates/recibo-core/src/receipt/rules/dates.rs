//! Transaction date extraction.

use chrono::NaiveDate;

use super::patterns::DATE_MDY;
use super::LineRule;

/// Transaction date rule: first `M/D/YYYY` match anywhere in the document.
pub struct DateRule;

impl DateRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRule for DateRule {
    type Output = NaiveDate;

    fn apply(&self, lines: &[String]) -> Option<NaiveDate> {
        for line in lines {
            for caps in DATE_MDY.captures_iter(line) {
                if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%m/%d/%Y") {
                    return Some(date);
                }
            }
        }
        None
    }
}

/// Extract the transaction date; `None` when no date pattern appears.
pub fn extract_date(lines: &[String]) -> Option<NaiveDate> {
    DateRule::new().apply(lines)
}
