//! Shared PDF handling utilities
//!
//! Turns a registry PDF into recognized text:
//!
//! - `render`: rasterize every page at a fixed DPI
//! - `normalize`: grayscale, autocontrast and binarize each page
//! - `recognize`: run the OCR engine over the normalized bitmap

pub mod error;
pub mod normalize;
pub mod recognize;
pub mod render;

use std::path::Path;

use image::DynamicImage;
use shared_types::{RecognizedDocument, RecognizedPage};
use tracing::{debug, info};

pub use error::DocumentError;
pub use normalize::normalize_page;
pub use recognize::{RecognitionHint, TesseractRecognizer, TextRecognizer};
pub use render::{PageRenderer, PageVisitor, PdftoppmRenderer};

/// Render, normalize and recognize every page of `pdf_path`
///
/// Each page is normalized and recognized as soon as it is rendered, in
/// order; the first failing page aborts the whole document.
pub fn recognize_document(
    pdf_path: &Path,
    dpi: u32,
    renderer: &dyn PageRenderer,
    recognizer: &dyn TextRecognizer,
    hint: &RecognitionHint,
) -> Result<RecognizedDocument, DocumentError> {
    let mut recognized = Vec::new();
    let count = renderer.render(pdf_path, dpi, &mut |page: DynamicImage| {
        let index = recognized.len();
        let bitmap = normalize_page(&page);
        drop(page);
        let text = recognizer.recognize(&bitmap, hint)?;
        debug!("Page {}: {} characters recognized", index + 1, text.chars().count());
        recognized.push(RecognizedPage { index, text });
        Ok(())
    })?;
    info!("Recognized {} page(s) at {} dpi", count, dpi);

    Ok(RecognizedDocument::new(recognized))
}
