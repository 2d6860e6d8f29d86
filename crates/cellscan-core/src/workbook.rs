use std::io::Cursor;

use calamine::{Reader, Xlsx};
use serde::{Deserialize, Serialize};

use crate::error::CellscanError;

/// One company row: its ticker code and the region tokens for its report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRow {
    pub code: String,
    pub tokens: Vec<String>,
}

/// Read the company configuration sheet of an xlsx workbook.
///
/// Row 1 is a header. In every following row, column B holds the company
/// code and columns C onward hold region tokens. Blank token cells are
/// dropped and rows without a code are skipped.
pub fn parse_company_workbook(bytes: &[u8], sheet: &str) -> Result<Vec<CompanyRow>, CellscanError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| CellscanError::Workbook(format!("failed to open xlsx: {e}")))?;

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| CellscanError::Workbook(format!("sheet '{sheet}' not found: {e}")))?;

    let rows: Vec<Vec<Option<String>>> = range
        .rows()
        .map(|row| row.iter().map(cell_as_string).collect())
        .collect();

    Ok(companies_from_rows(&rows))
}

fn companies_from_rows(rows: &[Vec<Option<String>>]) -> Vec<CompanyRow> {
    rows.iter()
        .skip(1)
        .filter_map(|row| {
            let code = row.get(1).cloned().flatten()?;
            let tokens = row.iter().skip(2).flatten().cloned().collect();
            Some(CompanyRow { code, tokens })
        })
        .collect()
}

fn cell_as_string(cell: &calamine::Data) -> Option<String> {
    match cell {
        calamine::Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        calamine::Data::Float(f) => Some(f.to_string()),
        calamine::Data::Int(i) => Some(i.to_string()),
        calamine::Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| (!c.is_empty()).then(|| c.to_string()))
            .collect()
    }

    #[test]
    fn reads_codes_and_tokens_after_header() {
        let rows = vec![
            row(&["Name", "Code", "Region 1", "Region 2"]),
            row(&["Vinamilk", "VNM", "1,A2,10,10,100,50", "3,B2,0,0,50,50"]),
            row(&["FPT", "FPT", "", "2,C4,5,5,60,60"]),
        ];
        let companies = companies_from_rows(&rows);
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].code, "VNM");
        assert_eq!(companies[0].tokens.len(), 2);
        assert_eq!(companies[1].tokens, vec!["2,C4,5,5,60,60"]);
    }

    #[test]
    fn skips_rows_without_code() {
        let rows = vec![
            row(&["Name", "Code"]),
            row(&["Orphan", "", "1,A2,0,0,1,1"]),
            row(&["Short"]),
        ];
        assert!(companies_from_rows(&rows).is_empty());
    }

    #[test]
    fn numeric_cells_are_stringified() {
        assert_eq!(cell_as_string(&calamine::Data::Int(42)), Some("42".into()));
        assert_eq!(
            cell_as_string(&calamine::Data::String("  ".into())),
            None
        );
    }

    #[test]
    fn garbage_bytes_are_a_workbook_error() {
        let err = parse_company_workbook(b"not a zip", "Company").unwrap_err();
        assert!(matches!(err, CellscanError::Workbook(_)));
    }
}
