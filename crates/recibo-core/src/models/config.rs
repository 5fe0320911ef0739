//! Configuration structures for the ingestion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the recibo pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciboConfig {
    /// Document processing configuration.
    pub pdf: PdfConfig,

    /// OCR fallback configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

impl Default for ReciboConfig {
    fn default() -> Self {
        Self {
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Document text extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Try to extract embedded text before falling back to OCR.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to skip the OCR fallback.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Recognition confidence threshold (0.0 - 1.0).
    pub recognition_threshold: f32,

    /// Keep `[UNK]` placeholder tokens in recognized text.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            recognition_threshold: 0.0, // CTC confidence scores are inherently low
            keep_unk: false,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How many leading lines the vendor heuristic scans.
    pub vendor_scan_lines: usize,

    /// Extra vendor keyword -> canonical name pairs, merged over the
    /// built-in table.
    pub extra_vendors: Vec<(String, String)>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vendor_scan_lines: 5,
            extra_vendors: Vec::new(),
        }
    }
}

impl ReciboConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.ocr.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let config = ReciboConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ReciboConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pdf.min_text_length, 50);
        assert_eq!(back.extraction.vendor_scan_lines, 5);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: ReciboConfig =
            serde_json::from_str(r#"{"pdf": {"min_text_length": 10}}"#).unwrap();
        assert_eq!(config.pdf.min_text_length, 10);
        assert!(config.pdf.prefer_embedded_text);
        assert_eq!(config.ocr.detection_model, "det.onnx");
    }
}
