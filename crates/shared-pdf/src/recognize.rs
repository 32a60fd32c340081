//! OCR engine adapter

use std::path::PathBuf;
use std::process::Command;

use image::GrayImage;
use tracing::debug;

use crate::error::DocumentError;

/// Language and layout hints passed to the OCR engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionHint {
    /// Tesseract language list, e.g. `kor+eng`
    pub languages: String,
    /// Page segmentation mode; 6 treats the page as one uniform text block
    pub page_segmentation_mode: u8,
    /// OCR engine mode; 1 is the LSTM engine
    pub engine_mode: u8,
}

impl Default for RecognitionHint {
    fn default() -> Self {
        Self {
            languages: "kor+eng".to_string(),
            page_segmentation_mode: 6,
            engine_mode: 1,
        }
    }
}

/// Turns a normalized page bitmap into text
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &GrayImage, hint: &RecognitionHint) -> Result<String, DocumentError>;
}

/// Runs the `tesseract` command line tool
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    engine_path: PathBuf,
}

impl TesseractRecognizer {
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &GrayImage, hint: &RecognitionHint) -> Result<String, DocumentError> {
        let scratch = tempfile::Builder::new()
            .prefix("registry-page-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(scratch.path(), image::ImageFormat::Png)?;

        let output = Command::new(&self.engine_path)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(&hint.languages)
            .arg("--psm")
            .arg(hint.page_segmentation_mode.to_string())
            .arg("--oem")
            .arg(hint.engine_mode.to_string())
            .output()
            .map_err(|e| {
                DocumentError::RecognitionFailure(format!(
                    "failed to run {}: {}",
                    self.engine_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DocumentError::RecognitionFailure(format!(
                "{} exited with {}: {}",
                self.engine_path.display(),
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {} bytes", text.len());
        Ok(text)
    }
}
