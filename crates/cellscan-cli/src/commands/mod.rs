pub mod batch;
pub mod detections;
pub mod extract;
pub mod locate;
pub mod regions;

use std::path::{Path, PathBuf};

use cellscan_core::config::Settings;
use cellscan_core::model::PageImage;
use cellscan_core::ocr::tesseract::TesseractOcr;
use cellscan_core::plan::group_by_page;
use cellscan_core::region::parse_region_specs;
use cellscan_core::render::pdftoppm::PdftoppmRasterizer;

use crate::error::CliError;

/// Command-line overrides applied on top of the loaded settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub threshold: Option<f32>,
    pub dpi: Option<u32>,
    pub languages: Vec<String>,
}

/// Load settings from `path` (or defaults) and apply overrides.
pub fn load_settings(path: Option<&Path>, overrides: &Overrides) -> Result<Settings, CliError> {
    let mut settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(t) = overrides.threshold {
        settings.extraction.confidence_threshold = t;
    }
    if let Some(dpi) = overrides.dpi {
        settings.render.dpi = dpi;
    }
    if !overrides.languages.is_empty() {
        settings.ocr.languages = overrides.languages.clone();
    }

    settings.validate()?;
    Ok(settings)
}

/// Build the external tool backends, failing if either binary is missing.
pub fn backends(settings: &Settings) -> Result<(PdftoppmRasterizer, TesseractOcr), CliError> {
    let rasterizer = PdftoppmRasterizer::new(settings.render.clone());
    rasterizer.ensure_available()?;
    let ocr = TesseractOcr::new(settings.ocr.clone());
    ocr.ensure_available()?;
    Ok((rasterizer, ocr))
}

/// Collect region tokens from the command line and an optional file.
///
/// The file holds one token per line; blank lines and `#` comments are skipped.
pub fn read_tokens(inline: Vec<String>, file: Option<&Path>) -> Result<Vec<String>, CliError> {
    let mut tokens = inline;
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)?;
        tokens.extend(tokens_from_lines(&content));
    }
    Ok(tokens)
}

fn tokens_from_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Save the pages that some token refers to as `page_<n>.png` in `dir`.
pub fn save_referenced_pages(
    pages: &[PageImage],
    tokens: &[String],
    dir: &Path,
) -> Result<Vec<PathBuf>, CliError> {
    let plan = group_by_page(parse_region_specs(tokens).specs);
    let mut saved = Vec::new();
    for page in plan.pages() {
        let Some(image) = page.checked_sub(1).and_then(|i| pages.get(i as usize)) else {
            continue;
        };
        saved.push(image.save_png(dir)?);
    }
    tracing::info!(count = saved.len(), dir = %dir.display(), "saved page images");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellscan_core::error::CellscanError;

    fn settings_without_tools() -> Settings {
        let mut settings = Settings::default();
        settings.render.pdftoppm_bin = "/nonexistent/cellscan-pdftoppm".into();
        settings.ocr.tesseract_bin = "/nonexistent/cellscan-tesseract".into();
        settings
    }

    #[test]
    fn missing_tools_fail_before_any_work() {
        let settings = settings_without_tools();
        assert!(matches!(
            backends(&settings),
            Err(CliError::Core(CellscanError::PdftoppmNotFound))
        ));

        // Neither the PDF nor the workbook exists; the tool check comes first.
        let err = extract::run(
            "/nonexistent/report.pdf".into(),
            vec!["1,A2,0,0,10,10".into()],
            &settings,
            "table",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Core(CellscanError::PdftoppmNotFound)));

        let options = batch::BatchOptions {
            out_dir: "/nonexistent/results".into(),
            keep_pdf: false,
            keep_images: false,
            results_workbook: None,
        };
        let err = batch::run("/nonexistent/companies.xlsx".into(), &settings, &options).unwrap_err();
        assert!(matches!(err, CliError::Core(CellscanError::PdftoppmNotFound)));

        let err = detections::run("/nonexistent/report.pdf".into(), 1, &settings, "table").unwrap_err();
        assert!(matches!(err, CliError::Core(CellscanError::PdftoppmNotFound)));
    }

    #[test]
    fn token_file_skips_comments_and_blanks() {
        let content = "# revenue\n1,A2,10,10,100,50\n\n  2,B2,0,0,5,5  \n";
        assert_eq!(
            tokens_from_lines(content),
            vec!["1,A2,10,10,100,50", "2,B2,0,0,5,5"]
        );
    }

    #[test]
    fn overrides_win_over_defaults() {
        let overrides = Overrides {
            threshold: Some(0.7),
            dpi: Some(300),
            languages: vec!["eng".into()],
        };
        let settings = load_settings(None, &overrides).unwrap();
        assert_eq!(settings.extraction.confidence_threshold, 0.7);
        assert_eq!(settings.render.dpi, 300);
        assert_eq!(settings.ocr.languages, vec!["eng"]);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let overrides = Overrides {
            threshold: Some(2.0),
            ..Default::default()
        };
        assert!(load_settings(None, &overrides).is_err());
    }

    #[test]
    fn saves_only_referenced_existing_pages() {
        let dir = tempfile::tempdir().unwrap();
        let pages: Vec<PageImage> = (1..=3)
            .map(|n| PageImage {
                page_number: n,
                png: vec![n as u8],
            })
            .collect();
        let tokens = vec!["2,A1,0,0,1,1".to_string(), "9,B1,0,0,1,1".to_string()];
        let saved = save_referenced_pages(&pages, &tokens, dir.path()).unwrap();
        assert_eq!(saved, vec![dir.path().join("page_2.png")]);
    }
}
