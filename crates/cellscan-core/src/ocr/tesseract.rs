use std::collections::BTreeMap;
use std::io::Write;
use std::process::Command;

use crate::config::{Granularity, OcrSettings};
use crate::error::CellscanError;
use crate::geometry::box_polygon;
use crate::model::{Detection, PageImage};
use crate::ocr::DetectionSupplier;

/// OCR backend using the tesseract CLI in TSV mode.
pub struct TesseractOcr {
    settings: OcrSettings,
}

impl TesseractOcr {
    pub fn new(settings: OcrSettings) -> Self {
        TesseractOcr { settings }
    }

    /// Check if tesseract is available on the system.
    pub fn is_available(&self) -> bool {
        Command::new(&self.settings.tesseract_bin)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Fail early with `TesseractNotFound` when the configured binary cannot run.
    pub fn ensure_available(&self) -> Result<(), CellscanError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(CellscanError::TesseractNotFound)
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(OcrSettings::default())
    }
}

impl DetectionSupplier for TesseractOcr {
    fn detect(&self, page: &PageImage) -> Result<Vec<Detection>, CellscanError> {
        let mut tmpfile = tempfile::Builder::new()
            .prefix("cellscan-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| CellscanError::Ocr(e.to_string()))?;
        tmpfile
            .write_all(&page.png)
            .map_err(|e| CellscanError::Ocr(e.to_string()))?;

        let output = Command::new(&self.settings.tesseract_bin)
            .arg(tmpfile.path())
            .arg("stdout")
            .arg("-l")
            .arg(self.settings.languages.join("+"))
            .arg("tsv")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CellscanError::TesseractNotFound
                } else {
                    CellscanError::Ocr(format!("tesseract failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(CellscanError::TesseractFailed { code, stderr });
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let words = parse_tsv(&tsv);
        Ok(match self.settings.granularity {
            Granularity::Word => words.into_iter().map(TsvWord::into_detection).collect(),
            Granularity::Line => merge_lines(words),
        })
    }

    fn backend_name(&self) -> &str {
        "tesseract"
    }
}

/// Key identifying the text line a word belongs to.
type LineKey = (u32, u32, u32, u32);

#[derive(Debug, Clone, PartialEq)]
struct TsvWord {
    line: LineKey,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    /// 0..100 as reported by tesseract.
    conf: f32,
    text: String,
}

impl TsvWord {
    fn into_detection(self) -> Detection {
        Detection {
            polygon: box_polygon(self.left, self.top, self.width, self.height),
            text: self.text,
            confidence: self.conf / 100.0,
        }
    }
}

/// Parse tesseract TSV output into word rows, in output order.
///
/// Non-word levels, negative confidences and blank text are dropped, as are
/// rows that do not have all twelve columns.
fn parse_tsv(tsv: &str) -> Vec<TsvWord> {
    let mut words = Vec::new();

    for raw in tsv.lines() {
        let cols: Vec<&str> = raw.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }

        let text = cols[11..].join("\t").trim().to_string();
        if text.is_empty() {
            continue;
        }

        let parsed = (|| {
            Some(TsvWord {
                line: (
                    cols[1].parse().ok()?,
                    cols[2].parse().ok()?,
                    cols[3].parse().ok()?,
                    cols[4].parse().ok()?,
                ),
                left: cols[6].parse().ok()?,
                top: cols[7].parse().ok()?,
                width: cols[8].parse().ok()?,
                height: cols[9].parse().ok()?,
                conf: cols[10].parse().ok()?,
                text: text.clone(),
            })
        })();

        match parsed {
            Some(word) if word.conf >= 0.0 => words.push(word),
            Some(_) => {}
            None => tracing::debug!(row = raw, "unparseable tesseract row"),
        }
    }

    words
}

/// Merge words into one detection per line: union box, mean confidence.
///
/// Lines are emitted in the order their first word appeared.
fn merge_lines(words: Vec<TsvWord>) -> Vec<Detection> {
    let mut order: Vec<LineKey> = Vec::new();
    let mut lines: BTreeMap<LineKey, Vec<TsvWord>> = BTreeMap::new();

    for word in words {
        let entry = lines.entry(word.line).or_default();
        if entry.is_empty() {
            order.push(word.line);
        }
        entry.push(word);
    }

    order
        .into_iter()
        .filter_map(|key| lines.remove(&key))
        .map(|line_words| {
            let left = line_words.iter().map(|w| w.left).fold(f32::INFINITY, f32::min);
            let top = line_words.iter().map(|w| w.top).fold(f32::INFINITY, f32::min);
            let right = line_words
                .iter()
                .map(|w| w.left + w.width)
                .fold(f32::NEG_INFINITY, f32::max);
            let bottom = line_words
                .iter()
                .map(|w| w.top + w.height)
                .fold(f32::NEG_INFINITY, f32::max);
            let conf = line_words.iter().map(|w| w.conf).sum::<f32>() / line_words.len() as f32;
            let text = line_words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            Detection {
                polygon: box_polygon(left, top, right - left, bottom - top),
                text,
                confidence: conf / 100.0,
            }
        })
        .collect()
}
