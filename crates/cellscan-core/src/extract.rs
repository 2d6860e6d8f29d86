use std::collections::BTreeMap;

use crate::aggregate::merge_reading_order;
use crate::config::ExtractionConfig;
use crate::error::{CellscanError, RegionError};
use crate::model::{ExtractionReport, ExtractionResult, ExtractionWarning, PageImage};
use crate::ocr::DetectionSupplier;
use crate::plan::group_by_page;
use crate::region::parse_region_specs;
use crate::select::select_candidates;

/// Drives region extraction over one document.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Extractor { config }
    }

    /// Extract text for every valid token.
    ///
    /// `pages[i]` is page `i + 1`. The detection supplier runs at most once per
    /// distinct referenced page. Problems local to a token, detection or page
    /// are recorded as warnings; only an empty page collection or a fatal
    /// supplier error is returned as `Err`.
    pub fn run<S: AsRef<str>>(
        &self,
        pages: &[PageImage],
        ocr: &dyn DetectionSupplier,
        tokens: &[S],
    ) -> Result<ExtractionReport, CellscanError> {
        if pages.is_empty() {
            return Err(CellscanError::NoPages);
        }

        let mut report = ExtractionReport::default();

        let parsed = parse_region_specs(tokens);
        for error in &parsed.rejected {
            tracing::warn!(%error, "skipping region token");
            report.warnings.push(ExtractionWarning::new(error, None, None));
        }

        let plan = group_by_page(parsed.specs);

        for (page, specs) in plan.iter() {
            let Some(image) = page_image(pages, page) else {
                let error = RegionError::PageOutOfRange {
                    page,
                    page_count: pages.len(),
                };
                tracing::warn!(%error, regions = specs.len(), "skipping page");
                for spec in specs {
                    report.warnings.push(ExtractionWarning::new(
                        &error,
                        Some(spec.label.as_str()),
                        Some(page),
                    ));
                }
                continue;
            };

            let detections = match ocr.detect(image) {
                Ok(detections) => detections,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    let error = RegionError::OcrFailed {
                        page,
                        reason: e.to_string(),
                    };
                    tracing::warn!(%error, backend = ocr.backend_name(), "skipping page");
                    for spec in specs {
                        report.warnings.push(ExtractionWarning::new(
                            &error,
                            Some(spec.label.as_str()),
                            Some(page),
                        ));
                    }
                    continue;
                }
            };
            report.pages_recognized += 1;
            tracing::debug!(
                page,
                detections = detections.len(),
                regions = specs.len(),
                "recognized page"
            );

            // The same broken detection shows up for every region; report it once.
            let mut invalid: BTreeMap<usize, RegionError> = BTreeMap::new();

            for spec in specs {
                let selection =
                    select_candidates(&detections, &spec.rect, self.config.confidence_threshold);
                for bad in selection.invalid {
                    invalid.entry(bad.index).or_insert(bad.error);
                }
                report.results.push(ExtractionResult {
                    label: spec.label.clone(),
                    text: merge_reading_order(selection.candidates),
                });
            }

            for error in invalid.values() {
                report
                    .warnings
                    .push(ExtractionWarning::new(error, None, Some(page)));
            }
        }

        tracing::info!(
            results = report.results.len(),
            warnings = report.warnings.len(),
            pages = report.pages_recognized,
            "extraction finished"
        );

        Ok(report)
    }
}

fn page_image(pages: &[PageImage], page: u32) -> Option<&PageImage> {
    let index = usize::try_from(page).ok()?.checked_sub(1)?;
    pages.get(index)
}
