use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CellscanError {
    #[error("PDF rasterization failed: {0}")]
    Rasterize(String),

    #[error("pdftoppm not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftoppmNotFound,

    #[error("pdftoppm failed with exit code {code}: {stderr}")]
    PdftoppmFailed { code: i32, stderr: String },

    #[error("tesseract not found. Install it: brew install tesseract tesseract-lang (macOS) or apt install tesseract-ocr (Linux)")]
    TesseractNotFound,

    #[error("tesseract failed with exit code {code}: {stderr}")]
    TesseractFailed { code: i32, stderr: String },

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("document has no rasterized pages")]
    NoPages,

    #[error("failed to load settings from {path}: {reason}")]
    SettingsLoad { path: PathBuf, reason: String },

    #[error("invalid settings: {0}")]
    SettingsInvalid(String),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("invalid cell reference '{0}': expected a column letter followed by a row number")]
    InvalidCellRef(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CellscanError {
    /// True when the failure will repeat for every page (a missing tool),
    /// so continuing with the next page is pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CellscanError::PdftoppmNotFound | CellscanError::TesseractNotFound
        )
    }
}

/// Conditions local to a single token, detection or page.
///
/// These are recovered inside the extractor and surface as warnings on the
/// report rather than as an `Err`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("malformed region token '{token}': {reason}")]
    MalformedSpec { token: String, reason: String },

    #[error("invalid detection geometry: {0}")]
    InvalidGeometry(String),

    #[error("page {page} does not exist in the document (total pages: {page_count})")]
    PageOutOfRange { page: u32, page_count: usize },

    #[error("OCR failed on page {page}: {reason}")]
    OcrFailed { page: u32, reason: String },
}
