//! Receipt number (business key) extraction.

use super::LineRule;

/// Receipt number rule: a line carrying a "receipt" token and a `#`.
pub struct NumberRule;

impl NumberRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NumberRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRule for NumberRule {
    type Output = String;

    fn apply(&self, lines: &[String]) -> Option<String> {
        for line in lines {
            if !line.to_lowercase().contains("receipt") {
                continue;
            }
            let Some(hash) = line.find('#') else {
                continue;
            };
            let number = line[hash + 1..].trim();
            if !number.is_empty() {
                return Some(number.to_string());
            }
        }
        None
    }
}

/// Extract the receipt number; absence is legal but disables dedup.
pub fn extract_receipt_number(lines: &[String]) -> Option<String> {
    NumberRule::new().apply(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn takes_text_after_first_hash() {
        let lines = lines(&["Receipt #123456"]);
        assert_eq!(extract_receipt_number(&lines), Some("123456".to_string()));
    }

    #[test]
    fn token_match_is_case_insensitive() {
        let lines = lines(&["RECEIPT # TX-99 "]);
        assert_eq!(extract_receipt_number(&lines), Some("TX-99".to_string()));
    }

    #[test]
    fn requires_both_token_and_hash() {
        assert_eq!(extract_receipt_number(&lines(&["Receipt 123456"])), None);
        assert_eq!(extract_receipt_number(&lines(&["Order #123456"])), None);
    }

    #[test]
    fn empty_number_after_hash_is_absent() {
        assert_eq!(extract_receipt_number(&lines(&["Receipt #   "])), None);
    }
}
