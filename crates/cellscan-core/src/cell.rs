use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CellscanError;

/// Spreadsheet cell addressed by a region label such as `B12`.
///
/// The first character selects the column (A = 1); the rest is the 1-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub fn parse(label: &str) -> Result<CellRef, CellscanError> {
        let invalid = || CellscanError::InvalidCellRef(label.to_string());

        let mut chars = label.trim().chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return Err(invalid());
        }

        let row: u32 = chars.as_str().parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(CellRef {
            column: u32::from(letter) - u32::from('A') + 1,
            row,
        })
    }

    /// Column letter, or `'?'` when the column lies outside A..=Z.
    pub fn column_letter(&self) -> char {
        self.column
            .checked_sub(1)
            .and_then(|offset| u32::from('A').checked_add(offset))
            .and_then(char::from_u32)
            .filter(char::is_ascii_uppercase)
            .unwrap_or('?')
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letter(), self.row)
    }
}
