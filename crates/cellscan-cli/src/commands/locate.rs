use cellscan_core::config::Settings;

use crate::error::CliError;
use crate::source::ReportSource;

pub fn run(code: &str, settings: &Settings) -> Result<(), CliError> {
    let source = ReportSource::new(settings.source.clone())?;
    let url = source.locate(code)?;
    println!("{url}");
    Ok(())
}
