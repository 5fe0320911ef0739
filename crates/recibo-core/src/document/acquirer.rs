//! Text acquisition: direct extraction with OCR fallback.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, info, warn};

use crate::error::AcquireError;
use crate::models::config::PdfConfig;
use crate::models::receipt::{DocumentHint, ExtractedText, RawDocument};

#[cfg(feature = "ocr")]
use crate::ocr::PureOcrEngine;

use super::reader::DocumentReader;

/// Cloneable handle publishing acquisition progress in `[0, 1]`.
///
/// The published value is monotonically non-decreasing. This is observable
/// state for UI consumption only; it carries no correctness contract.
#[derive(Debug, Clone, Default)]
pub struct AcquireProgress(Arc<AtomicU32>);

impl AcquireProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current progress value.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Advance progress; values below the current one are ignored.
    pub(crate) fn advance(&self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                (value > f32::from_bits(bits)).then(|| value.to_bits())
            });
    }
}

/// Converts an arbitrary receipt document into text lines.
///
/// Tries machine-encoded text across all pages first; when the document
/// yields none (a scan), rasterizes the first page and runs OCR.
pub struct TextAcquirer {
    config: PdfConfig,
    #[cfg(feature = "ocr")]
    ocr: Option<PureOcrEngine>,
    progress: AcquireProgress,
}

impl TextAcquirer {
    pub fn new(config: PdfConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "ocr")]
            ocr: None,
            progress: AcquireProgress::new(),
        }
    }

    /// Attach an OCR engine for the scanned-image fallback.
    #[cfg(feature = "ocr")]
    pub fn with_ocr(mut self, engine: PureOcrEngine) -> Self {
        self.ocr = Some(engine);
        self
    }

    /// Handle for observing progress of the current acquisition.
    pub fn progress(&self) -> AcquireProgress {
        self.progress.clone()
    }

    /// Acquire text from a document.
    ///
    /// Either completes with the full [`ExtractedText`] or fails; partial
    /// results are never delivered.
    pub fn acquire(&self, document: &RawDocument) -> Result<ExtractedText, AcquireError> {
        self.progress.advance(0.05);

        // An image-only document (camera scan) has no text layer at all;
        // recognition is the only path.
        if document.hint() == DocumentHint::Image {
            if let Ok(image) = image::load_from_memory(document.data()) {
                let text = self.ocr_image(&image)?;
                self.progress.advance(1.0);
                return Ok(text);
            }
            // Not a raster file; fall through and treat it as a scanned
            // document container.
        }

        let reader = DocumentReader::load(document.data())?;
        self.progress.advance(0.2);

        let direct = if document.hint() == DocumentHint::Image || !self.config.prefer_embedded_text
        {
            String::new()
        } else {
            self.direct_text(&reader)?
        };
        self.progress.advance(0.4);

        if !direct.is_empty() && direct.len() >= self.config.min_text_length {
            info!("Acquired {} chars of embedded text", direct.len());
            self.progress.advance(1.0);
            return Ok(ExtractedText::from_text(&direct));
        }

        if direct.is_empty() {
            debug!("No embedded text, falling back to OCR");
            let text = self.ocr_fallback(&reader)?;
            self.progress.advance(1.0);
            return Ok(text);
        }

        // Hybrid scan with a token amount of embedded text: prefer OCR, but
        // the embedded text is still a usable answer if recognition fails.
        debug!(
            "Embedded text below threshold ({} < {}), trying OCR",
            direct.len(),
            self.config.min_text_length
        );
        match self.ocr_fallback(&reader) {
            Ok(text) => {
                self.progress.advance(1.0);
                Ok(text)
            }
            Err(e) => {
                warn!("OCR fallback failed ({}), keeping embedded text", e);
                self.progress.advance(1.0);
                Ok(ExtractedText::from_text(&direct))
            }
        }
    }

    /// Page texts concatenated in page order, separated by a line break.
    fn direct_text(&self, reader: &DocumentReader) -> Result<String, AcquireError> {
        let pages = reader.page_texts()?;
        Ok(pages.join("\n").trim().to_string())
    }

    fn ocr_fallback(&self, reader: &DocumentReader) -> Result<ExtractedText, AcquireError> {
        let image = reader.first_page_image().ok_or_else(|| {
            AcquireError::RecognitionFailed("document has no page image to recognize".into())
        })?;
        self.progress.advance(0.6);
        self.ocr_image(&image)
    }

    #[cfg(feature = "ocr")]
    fn ocr_image(&self, image: &image::DynamicImage) -> Result<ExtractedText, AcquireError> {
        let Some(engine) = self.ocr.as_ref() else {
            return Err(AcquireError::RecognitionFailed(
                "no OCR engine configured".into(),
            ));
        };

        let result = engine.process(image)?;
        self.progress.advance(0.95);

        let text = ExtractedText::from_lines(result.lines());
        if text.is_empty() {
            return Err(AcquireError::RecognitionFailed(
                "recognizer produced no text".into(),
            ));
        }

        info!("OCR recognized {} lines", text.lines().len());
        Ok(text)
    }

    #[cfg(not(feature = "ocr"))]
    fn ocr_image(&self, _image: &image::DynamicImage) -> Result<ExtractedText, AcquireError> {
        Err(AcquireError::RecognitionFailed(
            "OCR support not compiled in (enable the `ocr` feature)".into(),
        ))
    }
}
