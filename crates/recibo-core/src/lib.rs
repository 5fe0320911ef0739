//! Core library for receipt ingestion.
//!
//! This crate provides:
//! - Document processing (embedded text extraction with OCR fallback)
//! - Heuristic field extraction (vendor, date, receipt number, totals, items)
//! - Receipt data models shared with the sync layer

pub mod document;
pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use document::{AcquireProgress, DocumentReader, TextAcquirer, TextSource};
pub use error::{AcquireError, OcrError, ReciboError, Result};
pub use models::config::ReciboConfig;
pub use models::receipt::{
    DocumentHint, ExtractedText, LineItem, ParsedReceipt, RawDocument,
};
pub use receipt::ReceiptExtractor;

#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
