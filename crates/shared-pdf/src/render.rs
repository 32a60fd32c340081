//! PDF page rasterization

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::debug;

use crate::error::DocumentError;

/// Receives rendered pages one at a time; an error stops rendering
pub type PageVisitor<'a> = dyn FnMut(DynamicImage) -> Result<(), DocumentError> + 'a;

/// Renders the pages of a PDF into bitmaps, in page order
pub trait PageRenderer: Send + Sync {
    /// Hand each page to `visit` before the next one is decoded, so only one
    /// full-resolution bitmap is alive at a time. Returns the page count.
    fn render(
        &self,
        pdf_path: &Path,
        dpi: u32,
        visit: &mut PageVisitor<'_>,
    ) -> Result<usize, DocumentError>;
}

/// Rasterizes pages with poppler's `pdftoppm`
///
/// Output PNGs live in a temporary directory that is removed when rendering
/// returns, whether or not it succeeded.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: PathBuf,
}

impl PdftoppmRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render(
        &self,
        pdf_path: &Path,
        dpi: u32,
        visit: &mut PageVisitor<'_>,
    ) -> Result<usize, DocumentError> {
        let workdir = tempfile::tempdir()?;
        let prefix = workdir.path().join("page");

        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                DocumentError::RenderFailure(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DocumentError::RenderFailure(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let mut numbered = Vec::new();
        for entry in std::fs::read_dir(workdir.path())? {
            let path = entry?.path();
            if let Some(number) = page_number(&path) {
                numbered.push((number, path));
            }
        }
        numbered.sort_by_key(|(number, _)| *number);

        if numbered.is_empty() {
            return Err(DocumentError::RenderFailure(
                "renderer produced no pages".to_string(),
            ));
        }

        let count = numbered.len();
        for (number, path) in numbered {
            debug!("Loading rendered page {} from {}", number, path.display());
            visit(image::open(&path)?)?;
        }

        Ok(count)
    }
}

/// Page number from a `pdftoppm` output name such as `page-07.png`
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (_, number) = stem.rsplit_once('-')?;
    number.parse().ok()
}
