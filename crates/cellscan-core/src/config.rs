use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CellscanError;
use crate::select::DEFAULT_CONFIDENCE_THRESHOLD;

/// All tunables for one run, passed explicitly to the components that use them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extraction: ExtractionConfig,
    pub render: RenderSettings,
    pub ocr: OcrSettings,
    pub source: SourceSettings,
    pub workbook: WorkbookSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Detections must score strictly above this to be used.
    pub confidence_threshold: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub dpi: u32,
    pub pdftoppm_bin: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            dpi: 200,
            pdftoppm_bin: PathBuf::from("pdftoppm"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One detection per recognized text line, boxed by the union of its words.
    ///
    /// A region matches a detection only when one of the detection's corners
    /// falls inside it, so a line spanning a whole table row misses a region
    /// drawn around a single cell of that row.
    Line,
    /// One detection per word.
    #[default]
    Word,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language codes, e.g. `vie`, `eng`.
    pub languages: Vec<String>,
    pub granularity: Granularity,
    pub tesseract_bin: PathBuf,
}

impl Default for OcrSettings {
    fn default() -> Self {
        OcrSettings {
            languages: vec!["vie".into(), "eng".into()],
            granularity: Granularity::Word,
            tesseract_bin: PathBuf::from("tesseract"),
        }
    }
}

/// Where company reports are listed and downloaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Listing page URL; the company code is appended.
    pub lookup_url: String,
    /// Prefix for relative report links.
    pub base_url: String,
    /// Lowercase phrase identifying the wanted report row.
    pub report_keyword: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            lookup_url: "https://cafef.vn/du-lieu/Ajax/CongTy/BaoCaoTaiChinh.aspx?sym=".into(),
            base_url: "https://cafef.vn".into(),
            report_keyword: "báo cáo tài chính hợp nhất".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookSettings {
    pub sheet: String,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        WorkbookSettings {
            sheet: "Company".into(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Settings, CellscanError> {
        let content = std::fs::read_to_string(path).map_err(|e| CellscanError::SettingsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|e| CellscanError::SettingsLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON string (no file path context).
    pub fn from_json_str(json: &str) -> Result<Settings, CellscanError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CellscanError> {
        let t = self.extraction.confidence_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(CellscanError::SettingsInvalid(format!(
                "confidence_threshold {t} must be within [0, 1]"
            )));
        }

        if self.render.dpi == 0 || self.render.dpi > 1200 {
            return Err(CellscanError::SettingsInvalid(format!(
                "dpi {} must be between 1 and 1200",
                self.render.dpi
            )));
        }

        if self.ocr.languages.is_empty() {
            return Err(CellscanError::SettingsInvalid(
                "ocr.languages must not be empty".into(),
            ));
        }
        if let Some(lang) = self.ocr.languages.iter().find(|l| l.trim().is_empty()) {
            return Err(CellscanError::SettingsInvalid(format!(
                "invalid OCR language '{lang}'"
            )));
        }

        if self.workbook.sheet.trim().is_empty() {
            return Err(CellscanError::SettingsInvalid(
                "workbook.sheet must not be empty".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let s = Settings::from_json_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.extraction.confidence_threshold, 0.5);
        assert_eq!(s.render.dpi, 200);
        assert_eq!(s.ocr.languages, vec!["vie", "eng"]);
        assert_eq!(s.ocr.granularity, Granularity::Word);
        assert_eq!(s.workbook.sheet, "Company");
    }

    #[test]
    fn partial_override() {
        let s = Settings::from_json_str(
            r#"{ "extraction": { "confidence_threshold": 0.8 }, "ocr": { "granularity": "line" } }"#,
        )
        .unwrap();
        assert_eq!(s.extraction.confidence_threshold, 0.8);
        assert_eq!(s.ocr.granularity, Granularity::Line);
        assert_eq!(s.ocr.languages, vec!["vie", "eng"]);
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let err = Settings::from_json_str(r#"{ "extraction": { "confidence_threshold": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, CellscanError::SettingsInvalid(_)));
    }

    #[test]
    fn zero_dpi_rejected() {
        assert!(Settings::from_json_str(r#"{ "render": { "dpi": 0 } }"#).is_err());
    }

    #[test]
    fn empty_languages_rejected() {
        assert!(Settings::from_json_str(r#"{ "ocr": { "languages": [] } }"#).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::load(Path::new("/nonexistent/cellscan.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cellscan.json"));
    }
}
