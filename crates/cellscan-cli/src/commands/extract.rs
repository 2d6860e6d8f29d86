use std::path::PathBuf;

use cellscan_core::config::Settings;
use cellscan_core::render::PageRasterizer;

use crate::commands::{backends, save_referenced_pages};
use crate::error::CliError;
use crate::output;

pub fn run(
    pdf_file: PathBuf,
    tokens: Vec<String>,
    settings: &Settings,
    output_format: &str,
    keep_images: Option<PathBuf>,
) -> Result<(), CliError> {
    if tokens.is_empty() {
        return Err(CliError::Usage(
            "no regions given. Use --region or --regions-file".into(),
        ));
    }

    let (rasterizer, ocr) = backends(settings)?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let pages = rasterizer.rasterize(&pdf_bytes)?;

    if let Some(dir) = keep_images {
        save_referenced_pages(&pages, &tokens, &dir)?;
    }

    let report = cellscan_core::extract_pages(&pages, &ocr, &tokens, &settings.extraction)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_values(&output::cell_values(&report)),
    }

    if !report.warnings.is_empty() {
        eprintln!("{} warning(s):", report.warnings.len());
        output::print_warnings(&report.warnings);
    }

    Ok(())
}
