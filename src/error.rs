use thiserror::Error;

/// Errors surfaced by the filter → aggregate → chart pipeline and its I/O edges.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input dataset lacks one of the required columns (`Country`, `Funded`).
    #[error("dataset is missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("unknown region `{0}` (expected one of: all, emmena, eu)")]
    UnknownRegion(String),

    #[error("unknown funding filter `{0}` (expected one of: all, funded, not-funded)")]
    UnknownFundingFilter(String),

    #[error(
        "unknown chart type `{0}` (expected one of: choropleth, bubble, bar, lollipop, faceted)"
    )]
    UnknownChartType(String),

    /// The chart selector was handed a table whose shape does not fit the chart.
    #[error("configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed dataset: {0}")]
    Malformed(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("reading workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
