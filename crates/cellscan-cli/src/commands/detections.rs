use std::path::PathBuf;

use cellscan_core::config::Settings;
use cellscan_core::error::RegionError;
use cellscan_core::ocr::DetectionSupplier;
use cellscan_core::render::PageRasterizer;

use crate::commands::backends;
use crate::error::CliError;
use crate::output;

/// Dump the raw OCR detections of one page, for drawing region rectangles.
pub fn run(
    pdf_file: PathBuf,
    page: u32,
    settings: &Settings,
    output_format: &str,
) -> Result<(), CliError> {
    let (rasterizer, ocr) = backends(settings)?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let pages = rasterizer.rasterize(&pdf_bytes)?;

    let image = page
        .checked_sub(1)
        .and_then(|i| pages.get(i as usize))
        .ok_or_else(|| {
            CliError::Usage(
                RegionError::PageOutOfRange {
                    page,
                    page_count: pages.len(),
                }
                .to_string(),
            )
        })?;

    let detections = ocr.detect(image)?;

    match output_format {
        "json" => output::json::print(&detections)?,
        _ => output::table::print_detections(page, &detections),
    }

    Ok(())
}
