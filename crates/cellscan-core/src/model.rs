use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::RegionError;
use crate::geometry::Point;

/// One rasterized page of a document.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number within the source document.
    pub page_number: u32,
    /// PNG-encoded image data.
    pub png: Vec<u8>,
}

impl PageImage {
    /// Write the page as `page_<n>.png` inside `dir`, creating `dir` if needed.
    pub fn save_png(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("page_{}.png", self.page_number));
        std::fs::write(&path, &self.png)?;
        Ok(path)
    }
}

/// One OCR-recognized text span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding polygon in image pixel coordinates, at least 3 vertices.
    pub polygon: Vec<Point>,
    pub text: String,
    /// Recognition confidence in [0, 1].
    pub confidence: f32,
}

/// Text extracted for one region, keyed by the region's label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub label: String,
    pub text: String,
}

impl ExtractionResult {
    /// True when the region was checked and nothing qualified.
    pub fn is_empty_selection(&self) -> bool {
        self.text == crate::aggregate::NO_TEXT_FOUND
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MalformedSpec,
    InvalidGeometry,
    PageOutOfRange,
    OcrFailed,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MalformedSpec => write!(f, "malformed spec"),
            WarningKind::InvalidGeometry => write!(f, "invalid geometry"),
            WarningKind::PageOutOfRange => write!(f, "page out of range"),
            WarningKind::OcrFailed => write!(f, "ocr failed"),
        }
    }
}

/// A condition recovered during extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    /// Region label the condition applies to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub message: String,
}

impl ExtractionWarning {
    pub fn new(error: &RegionError, label: Option<&str>, page: Option<u32>) -> Self {
        let kind = match error {
            RegionError::MalformedSpec { .. } => WarningKind::MalformedSpec,
            RegionError::InvalidGeometry(_) => WarningKind::InvalidGeometry,
            RegionError::PageOutOfRange { .. } => WarningKind::PageOutOfRange,
            RegionError::OcrFailed { .. } => WarningKind::OcrFailed,
        };
        ExtractionWarning {
            kind,
            label: label.map(str::to_string),
            page,
            message: error.to_string(),
        }
    }
}

/// Everything produced by one extraction pass over a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// One entry per attempted region, ordered by page then token order.
    pub results: Vec<ExtractionResult>,
    pub warnings: Vec<ExtractionWarning>,
    /// Number of pages the detection supplier was invoked for.
    pub pages_recognized: usize,
}

impl ExtractionReport {
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ExtractionWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}
