use thiserror::Error;

/// Failures that stop the whole analysis; no charts are produced.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to parse CSV: {0}")]
    Parse(#[from] csv::Error),

    #[error("CSV must contain 'Review', 'Rating', and 'Date' columns (missing: {})", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("row {row} has {found} fields but the header has {expected}")]
    ExtraFields {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures that only suppress one output section.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionError {
    #[error("No data available for average rating calculation.")]
    NoData,

    #[error("No valid reviews available for word cloud generation.")]
    NoText,
}
