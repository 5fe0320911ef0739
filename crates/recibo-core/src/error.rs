//! Error types for the recibo-core library.

use thiserror::Error;

/// Main error type for the recibo core library.
#[derive(Error, Debug)]
pub enum ReciboError {
    /// Document acquisition error.
    #[error("acquisition error: {0}")]
    Acquire(#[from] AcquireError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while acquiring text from a document.
///
/// Acquisition is terminal for an ingestion attempt: no partial text is
/// ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// The document could not be opened at all.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// OCR fallback produced no usable result or the recognizer failed.
    #[error("text recognition failed: {0}")]
    RecognitionFailed(String),
}

/// Errors related to the OCR engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl From<OcrError> for AcquireError {
    fn from(err: OcrError) -> Self {
        AcquireError::RecognitionFailed(err.to_string())
    }
}

/// Result type for the recibo core library.
pub type Result<T> = std::result::Result<T, ReciboError>;
