use std::io::Write;
use std::path::Path;
use std::process::Command;

use crate::config::RenderSettings;
use crate::error::CellscanError;
use crate::model::PageImage;
use crate::render::PageRasterizer;

const OUTPUT_PREFIX: &str = "page";

/// Rasterization backend using pdftoppm (from poppler-utils).
pub struct PdftoppmRasterizer {
    settings: RenderSettings,
}

impl PdftoppmRasterizer {
    pub fn new(settings: RenderSettings) -> Self {
        PdftoppmRasterizer { settings }
    }

    /// Check if pdftoppm is available on the system.
    pub fn is_available(&self) -> bool {
        Command::new(&self.settings.pdftoppm_bin)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    /// Fail early with `PdftoppmNotFound` when the configured binary cannot run.
    pub fn ensure_available(&self) -> Result<(), CellscanError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(CellscanError::PdftoppmNotFound)
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, CellscanError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| CellscanError::Rasterize(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| CellscanError::Rasterize(e.to_string()))?;
        let out_dir = tempfile::tempdir().map_err(|e| CellscanError::Rasterize(e.to_string()))?;

        let output = Command::new(&self.settings.pdftoppm_bin)
            .arg("-png")
            .arg("-r")
            .arg(self.settings.dpi.to_string())
            .arg(tmpfile.path())
            .arg(out_dir.path().join(OUTPUT_PREFIX))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CellscanError::PdftoppmNotFound
                } else {
                    CellscanError::Rasterize(format!("pdftoppm failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(CellscanError::PdftoppmFailed { code, stderr });
        }

        let pages = collect_pages(out_dir.path())?;
        if pages.is_empty() {
            return Err(CellscanError::NoPages);
        }
        tracing::debug!(pages = pages.len(), dpi = self.settings.dpi, "rasterized PDF");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftoppm"
    }
}

/// Read `page-N.png` files from `dir`, ordered by N.
fn collect_pages(dir: &Path) -> Result<Vec<PageImage>, CellscanError> {
    let mut numbered = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(page_number) = page_number_from_file_name(name) {
            numbered.push((page_number, path));
        }
    }
    numbered.sort_by_key(|(n, _)| *n);

    numbered
        .into_iter()
        .map(|(page_number, path)| -> Result<PageImage, CellscanError> {
            Ok(PageImage {
                page_number,
                png: std::fs::read(&path)?,
            })
        })
        .collect()
}

/// pdftoppm zero-pads page numbers to the width of the page count
/// (`page-1.png`, `page-01.png`, `page-001.png`, ...).
fn page_number_from_file_name(name: &str) -> Option<u32> {
    let digits = name
        .strip_prefix(OUTPUT_PREFIX)?
        .strip_prefix('-')?
        .strip_suffix(".png")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_fails_the_availability_check() {
        let rasterizer = PdftoppmRasterizer::new(RenderSettings {
            pdftoppm_bin: "/nonexistent/cellscan-pdftoppm".into(),
            ..RenderSettings::default()
        });
        assert!(!rasterizer.is_available());
        assert!(matches!(
            rasterizer.ensure_available(),
            Err(CellscanError::PdftoppmNotFound)
        ));
    }

    #[test]
    fn parses_padded_page_numbers() {
        assert_eq!(page_number_from_file_name("page-1.png"), Some(1));
        assert_eq!(page_number_from_file_name("page-07.png"), Some(7));
        assert_eq!(page_number_from_file_name("page-120.png"), Some(120));
    }

    #[test]
    fn rejects_foreign_file_names() {
        assert_eq!(page_number_from_file_name("page-.png"), None);
        assert_eq!(page_number_from_file_name("page-1.ppm"), None);
        assert_eq!(page_number_from_file_name("thumb-1.png"), None);
        assert_eq!(page_number_from_file_name("page-+1.png"), None);
    }

    #[test]
    fn collects_pages_in_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("page-10.png", "ten"),
            ("page-02.png", "two"),
            ("page-01.png", "one"),
            ("notes.txt", "skip"),
        ] {
            std::fs::write(dir.path().join(name), body).unwrap();
        }

        let pages = collect_pages(dir.path()).unwrap();
        let numbers: Vec<_> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 10]);
        assert_eq!(pages[0].png, b"one");
    }
}
