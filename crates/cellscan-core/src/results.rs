use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};

use crate::cell::CellRef;
use crate::error::CellscanError;

/// Extracted text laid out as spreadsheet cells, one sheet per company code.
///
/// Writing to a sheet that already exists adds to it; a later value for the
/// same cell replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct ResultsWorkbook {
    sheets: Vec<(String, BTreeMap<CellRef, String>)>,
}

impl ResultsWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `values` into the sheet named `sheet`, creating it if needed.
    ///
    /// The sheet is created even when `values` is empty.
    pub fn write_values<'a, I>(&mut self, sheet: &str, values: I)
    where
        I: IntoIterator<Item = (CellRef, &'a str)>,
    {
        let index = match self.sheets.iter().position(|(name, _)| name == sheet) {
            Some(index) => index,
            None => {
                self.sheets.push((sheet.to_string(), BTreeMap::new()));
                self.sheets.len() - 1
            }
        };
        let cells = &mut self.sheets[index].1;
        for (cell, text) in values {
            cells.insert(cell, text.to_string());
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Serialize to xlsx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CellscanError> {
        self.build()?.save_to_buffer().map_err(xlsx_error)
    }

    /// Write the workbook to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), CellscanError> {
        self.build()?.save(path).map_err(xlsx_error)?;
        tracing::debug!(path = %path.display(), sheets = self.sheets.len(), "results workbook saved");
        Ok(())
    }

    fn build(&self) -> Result<Workbook, CellscanError> {
        let mut workbook = Workbook::new();
        for (name, cells) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(name)
                .map_err(|e| CellscanError::Workbook(format!("invalid sheet name '{name}': {e}")))?;

            for (cell, text) in cells {
                let (row, column) = zero_based(cell)?;
                worksheet
                    .write_string(row, column, text)
                    .map_err(|e| CellscanError::Workbook(format!("cannot write {cell}: {e}")))?;
            }
        }
        Ok(workbook)
    }
}

fn zero_based(cell: &CellRef) -> Result<(u32, u16), CellscanError> {
    let row = cell.row.checked_sub(1);
    let column = cell
        .column
        .checked_sub(1)
        .and_then(|c| u16::try_from(c).ok());
    match (row, column) {
        (Some(row), Some(column)) => Ok((row, column)),
        _ => Err(CellscanError::InvalidCellRef(cell.to_string())),
    }
}

fn xlsx_error(e: XlsxError) -> CellscanError {
    CellscanError::Workbook(format!("failed to write xlsx: {e}"))
}
