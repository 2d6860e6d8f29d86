pub mod aggregate;
pub mod cell;
pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod model;
pub mod ocr;
pub mod plan;
pub mod region;
pub mod render;
pub mod results;
pub mod select;
pub mod workbook;

use config::ExtractionConfig;
use error::CellscanError;
use extract::Extractor;
use model::{ExtractionReport, PageImage};
use ocr::DetectionSupplier;
use render::PageRasterizer;

pub use aggregate::NO_TEXT_FOUND;

/// Main API entry point: rasterize a PDF and extract text for each region token.
///
/// Tokens have the form `page,label,x1,y1,x2,y2`. Each referenced page is
/// recognized once no matter how many regions point at it.
pub fn extract_pdf<S: AsRef<str>>(
    pdf_bytes: &[u8],
    rasterizer: &dyn PageRasterizer,
    ocr: &dyn DetectionSupplier,
    tokens: &[S],
    config: &ExtractionConfig,
) -> Result<ExtractionReport, CellscanError> {
    let pages = rasterizer.rasterize(pdf_bytes)?;
    tracing::debug!(
        backend = rasterizer.backend_name(),
        pages = pages.len(),
        "document rasterized"
    );
    extract_pages(&pages, ocr, tokens, config)
}

/// Extract region text from already rasterized pages (`pages[0]` is page 1).
pub fn extract_pages<S: AsRef<str>>(
    pages: &[PageImage],
    ocr: &dyn DetectionSupplier,
    tokens: &[S],
    config: &ExtractionConfig,
) -> Result<ExtractionReport, CellscanError> {
    Extractor::new(config.clone()).run(pages, ocr, tokens)
}
