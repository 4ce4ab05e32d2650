use thiserror::Error;

/// Everything that can go wrong inside a scan. None of these reach the caller
/// of `scan`; they are logged and the scan degrades to fewer listings.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("browser session could not be created: {0}")]
    Session(String),

    #[error("no listing appeared within {0:?}")]
    RenderTimeout(std::time::Duration),

    #[error("browser operation failed: {0}")]
    Browser(String),

    #[error("fragment skipped: {0}")]
    FragmentParse(String),
}

/// Input problems of the `analyze` operation. These are surfaced to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Missing title or price")]
    MissingField,

    #[error("Invalid title")]
    InvalidTitle,

    #[error("Invalid price")]
    InvalidPrice,
}
