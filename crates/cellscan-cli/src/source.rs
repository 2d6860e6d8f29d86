//! Locating and downloading a company's financial report.

use std::time::Duration;

use cellscan_core::config::SourceSettings;
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::error::CliError;

pub struct ReportSource {
    client: Client,
    settings: SourceSettings,
}

impl ReportSource {
    pub fn new(settings: SourceSettings) -> Result<Self, CliError> {
        let client = Client::builder()
            .user_agent(concat!("cellscan/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(ReportSource { client, settings })
    }

    /// Find the report PDF URL for a company code.
    pub fn locate(&self, code: &str) -> Result<String, CliError> {
        let listing_url = format!("{}{}", self.settings.lookup_url, code);
        tracing::debug!(%listing_url, "fetching report listing");

        let html = self
            .client
            .get(&listing_url)
            .send()?
            .error_for_status()?
            .text()?;

        let url = locate_report_url(&html, &self.settings).ok_or_else(|| {
            CliError::ReportNotFound {
                code: code.to_string(),
            }
        })?;
        tracing::info!(code, %url, "located report");
        Ok(url)
    }

    pub fn download(&self, url: &str) -> Result<Vec<u8>, CliError> {
        let bytes = self.client.get(url).send()?.error_for_status()?.bytes()?;
        tracing::info!(url, size = bytes.len(), "downloaded report");
        Ok(bytes.to_vec())
    }
}

/// Pick the report link out of a listing page.
///
/// Looks at the second `<table>` for the first row whose text contains the
/// configured keyword and whose first link points at a `.pdf`.
pub fn locate_report_url(html: &str, settings: &SourceSettings) -> Option<String> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").ok()?;
    let row_selector = Selector::parse("tr").ok()?;
    let link_selector = Selector::parse("a[href]").ok()?;

    let keyword = settings.report_keyword.to_lowercase();
    let table = document.select(&table_selector).nth(1)?;

    for row in table.select(&row_selector) {
        let text = row.text().collect::<String>().to_lowercase();
        if !text.contains(&keyword) {
            continue;
        }

        let href = row
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"));
        match href {
            Some(href) if href.ends_with(".pdf") => {
                return Some(absolute_url(href, &settings.base_url));
            }
            _ => tracing::debug!(row = %text.trim(), "matching row has no PDF link"),
        }
    }

    None
}

fn absolute_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    }
}

/// File name for a downloaded report, taken from the last URL segment.
pub fn file_name_from_url(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("report.pdf")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body>
  <table><tr><td>Báo cáo tài chính hợp nhất (menu)</td></tr></table>
  <table>
    <tr><td>Báo cáo tài chính công ty mẹ Quý 3</td><td><a href="/data/me-q3.pdf">Tải</a></td></tr>
    <tr><td>BÁO CÁO TÀI CHÍNH HỢP NHẤT Quý 3</td><td><a href="/data/view.aspx">Xem</a></td></tr>
    <tr><td>Báo cáo tài chính hợp nhất Quý 2</td><td><a href="/data/hn-q2.pdf">Tải</a></td></tr>
    <tr><td>Báo cáo tài chính hợp nhất Quý 1</td><td><a href="/data/hn-q1.pdf">Tải</a></td></tr>
  </table>
</body></html>"#;

    #[test]
    fn picks_first_matching_pdf_in_second_table() {
        let url = locate_report_url(LISTING, &SourceSettings::default()).unwrap();
        assert_eq!(url, "https://cafef.vn/data/hn-q2.pdf");
    }

    #[test]
    fn keeps_absolute_links() {
        let html = r#"<table></table><table><tr><td>Báo cáo tài chính hợp nhất</td>
            <td><a href="https://cdn.example.com/x.pdf">x</a></td></tr></table>"#;
        let url = locate_report_url(html, &SourceSettings::default()).unwrap();
        assert_eq!(url, "https://cdn.example.com/x.pdf");
    }

    #[test]
    fn single_table_yields_nothing() {
        let html = r#"<table><tr><td>Báo cáo tài chính hợp nhất</td>
            <td><a href="/a.pdf">x</a></td></tr></table>"#;
        assert_eq!(locate_report_url(html, &SourceSettings::default()), None);
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name_from_url("https://cafef.vn/data/hn-q2.pdf"), "hn-q2.pdf");
        assert_eq!(file_name_from_url("https://cafef.vn/"), "report.pdf");
    }
}
