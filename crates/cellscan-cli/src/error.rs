use cellscan_core::error::CellscanError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CellscanError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no consolidated report PDF found for company '{code}'")]
    ReportNotFound { code: String },

    #[error("{0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
