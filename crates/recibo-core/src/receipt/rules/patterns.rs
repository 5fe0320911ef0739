//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Transaction date: M/D/YYYY with 1-2 digit month/day and 4-digit year
    pub static ref DATE_MDY: Regex = Regex::new(
        r"\b(\d{1,2}/\d{1,2}/\d{4})\b"
    ).unwrap();

    // Monetary amount with exactly two decimal places
    pub static ref AMOUNT: Regex = Regex::new(
        r"\b(\d+\.\d{2})\b"
    ).unwrap();

    // A line item: free text followed by a trailing price at end of line
    pub static ref TRAILING_ITEM: Regex = Regex::new(
        r"^(.*\S)\s+(\d+\.\d{2})\s*$"
    ).unwrap();
}
