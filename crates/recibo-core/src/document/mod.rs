//! Document processing: text acquisition with OCR fallback.

mod acquirer;
mod reader;

pub use acquirer::{AcquireProgress, TextAcquirer};
pub use reader::DocumentReader;

use crate::error::AcquireError;
use crate::models::receipt::{ExtractedText, RawDocument};

/// Seam for anything that can turn a document into text lines.
///
/// The sync layer depends on this trait rather than on [`TextAcquirer`]
/// directly so tests can substitute canned text.
pub trait TextSource: Send + Sync {
    /// Acquire text from a document; all-or-nothing, never partial.
    fn acquire(&self, document: &RawDocument) -> Result<ExtractedText, AcquireError>;
}

impl TextSource for TextAcquirer {
    fn acquire(&self, document: &RawDocument) -> Result<ExtractedText, AcquireError> {
        TextAcquirer::acquire(self, document)
    }
}
