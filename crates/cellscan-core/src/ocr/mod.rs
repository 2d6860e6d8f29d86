pub mod tesseract;

use crate::error::CellscanError;
use crate::model::{Detection, PageImage};

/// Trait for OCR backends that turn one page image into raw detections.
pub trait DetectionSupplier: Send + Sync {
    /// Recognize text on one page, in the engine's native detection order.
    fn detect(&self, page: &PageImage) -> Result<Vec<Detection>, CellscanError>;

    /// Name of this OCR backend (for diagnostics).
    fn backend_name(&self) -> &str {
        "custom"
    }
}

impl<F> DetectionSupplier for F
where
    F: Fn(&PageImage) -> Result<Vec<Detection>, CellscanError> + Send + Sync,
{
    fn detect(&self, page: &PageImage) -> Result<Vec<Detection>, CellscanError> {
        self(page)
    }
}
