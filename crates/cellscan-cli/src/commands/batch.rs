use std::path::{Path, PathBuf};

use cellscan_core::config::Settings;
use cellscan_core::ocr::DetectionSupplier;
use cellscan_core::render::PageRasterizer;
use cellscan_core::results::ResultsWorkbook;
use cellscan_core::workbook::{parse_company_workbook, CompanyRow};

use crate::commands::{backends, save_referenced_pages};
use crate::error::CliError;
use crate::output::{self, CompanyReport};
use crate::source::{file_name_from_url, ReportSource};

pub struct BatchOptions {
    pub out_dir: PathBuf,
    pub keep_pdf: bool,
    pub keep_images: bool,
    /// Also write every company's values into this xlsx, one sheet per code.
    pub results_workbook: Option<PathBuf>,
}

/// Process every company in the configuration workbook.
///
/// A failure for one company is logged and the batch moves on.
pub fn run(workbook: PathBuf, settings: &Settings, options: &BatchOptions) -> Result<(), CliError> {
    let (rasterizer, ocr) = backends(settings)?;

    let bytes = std::fs::read(&workbook)?;
    let companies = parse_company_workbook(&bytes, &settings.workbook.sheet)?;
    std::fs::create_dir_all(&options.out_dir)?;

    let source = ReportSource::new(settings.source.clone())?;
    let mut results = ResultsWorkbook::new();

    let mut failed = Vec::new();
    for company in &companies {
        eprintln!("Processing company {}", company.code);
        let outcome = process_company(company, &source, &rasterizer, &ocr, settings, options)
            .and_then(|report| {
                let path = write_report(&options.out_dir, &report)?;
                if let Some(results_path) = &options.results_workbook {
                    record_values(&mut results, &report);
                    results.save(results_path)?;
                }
                Ok(path)
            });
        match outcome {
            Ok(path) => eprintln!("  written to {}", path.display()),
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => {
                tracing::warn!(code = %company.code, error = %e, "company failed");
                eprintln!("  failed: {e}");
                failed.push(company.code.as_str());
            }
        }
    }

    eprintln!(
        "\nProcessed {} company(ies), {} failed{}",
        companies.len(),
        failed.len(),
        if failed.is_empty() {
            String::new()
        } else {
            format!(": {}", failed.join(", "))
        }
    );

    Ok(())
}

fn process_company(
    company: &CompanyRow,
    source: &ReportSource,
    rasterizer: &dyn PageRasterizer,
    ocr: &dyn DetectionSupplier,
    settings: &Settings,
    options: &BatchOptions,
) -> Result<CompanyReport, CliError> {
    let url = source.locate(&company.code)?;
    let pdf_bytes = source.download(&url)?;

    if options.keep_pdf {
        let dir = options.out_dir.join("reports");
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(file_name_from_url(&url)), &pdf_bytes)?;
    }

    let pages = rasterizer.rasterize(&pdf_bytes)?;
    if options.keep_images {
        let dir = options.out_dir.join("images").join(&company.code);
        save_referenced_pages(&pages, &company.tokens, &dir)?;
    }

    let report =
        cellscan_core::extract_pages(&pages, ocr, &company.tokens, &settings.extraction)?;
    output::print_warnings(&report.warnings);

    Ok(CompanyReport {
        code: company.code.clone(),
        source_url: url,
        values: output::cell_values(&report),
        warnings: report.warnings,
    })
}

fn write_report(out_dir: &Path, report: &CompanyReport) -> Result<PathBuf, CliError> {
    let path = out_dir.join(format!("{}.json", report.code));
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}

/// Put a company's cell-addressed values into its sheet of the results workbook.
fn record_values(results: &mut ResultsWorkbook, report: &CompanyReport) {
    let values = report
        .values
        .iter()
        .filter_map(|v| v.cell.map(|cell| (cell, v.text.as_str())));
    results.write_values(&report.code, values);
    tracing::debug!(code = %report.code, sheets = results.sheet_count(), "results recorded");
}

fn is_fatal(e: &CliError) -> bool {
    matches!(e, CliError::Core(core) if core.is_fatal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CellValue;
    use calamine::{Data, Reader, Xlsx};
    use cellscan_core::cell::CellRef;

    fn report(code: &str, values: &[(&str, &str)]) -> CompanyReport {
        CompanyReport {
            code: code.into(),
            source_url: format!("https://cafef.vn/data/{code}.pdf"),
            values: values
                .iter()
                .map(|(label, text)| CellValue {
                    label: label.to_string(),
                    cell: CellRef::parse(label).ok(),
                    text: text.to_string(),
                })
                .collect(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn company_values_round_trip_through_results_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.xlsx");

        let mut results = ResultsWorkbook::new();
        record_values(
            &mut results,
            &report("VNM", &[("B12", "1.234.567"), ("revenue", "skipped")]),
        );
        record_values(&mut results, &report("FPT", &[("C4", "Lợi nhuận")]));
        results.save(&path).unwrap();

        let mut workbook: Xlsx<_> = calamine::open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["VNM", "FPT"]);

        let vnm = workbook.worksheet_range("VNM").unwrap();
        assert_eq!(vnm.get_value((11, 1)), Some(&Data::String("1.234.567".into())));
        assert_eq!(vnm.get_size(), (1, 1));

        let fpt = workbook.worksheet_range("FPT").unwrap();
        assert_eq!(fpt.get_value((3, 2)), Some(&Data::String("Lợi nhuận".into())));
    }

    #[test]
    fn fatal_only_for_missing_tools() {
        use cellscan_core::error::CellscanError;
        assert!(is_fatal(&CliError::Core(CellscanError::TesseractNotFound)));
        assert!(!is_fatal(&CliError::ReportNotFound { code: "VNM".into() }));
    }
}
