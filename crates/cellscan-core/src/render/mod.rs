pub mod pdftoppm;

use crate::error::CellscanError;
use crate::model::PageImage;

/// Trait for PDF rasterization backends.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of a PDF, returning images ordered by page (index 0 = page 1).
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, CellscanError>;

    /// Name of this rasterization backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
