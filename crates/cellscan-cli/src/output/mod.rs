pub mod json;
pub mod table;

use cellscan_core::cell::CellRef;
use cellscan_core::model::{ExtractionReport, ExtractionWarning};
use serde::Serialize;

/// An extraction result paired with the spreadsheet cell it is destined for.
#[derive(Debug, Clone, Serialize)]
pub struct CellValue {
    pub label: String,
    /// `None` when the label is not a single-letter cell reference.
    pub cell: Option<CellRef>,
    pub text: String,
}

/// Results of one company run, as written by `cellscan batch`.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    pub code: String,
    pub source_url: String,
    pub values: Vec<CellValue>,
    pub warnings: Vec<ExtractionWarning>,
}

pub fn cell_values(report: &ExtractionReport) -> Vec<CellValue> {
    report
        .results
        .iter()
        .map(|r| {
            let cell = match CellRef::parse(&r.label) {
                Ok(cell) => Some(cell),
                Err(error) => {
                    tracing::warn!(label = %r.label, %error, "label is not a cell reference");
                    None
                }
            };
            CellValue {
                label: r.label.clone(),
                cell,
                text: r.text.clone(),
            }
        })
        .collect()
}

/// Print recovered problems to stderr.
pub fn print_warnings(warnings: &[ExtractionWarning]) {
    for w in warnings {
        eprintln!("  warning ({}): {}", w.kind, w.message);
    }
}
