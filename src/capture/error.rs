use thiserror::Error;

/// Faults raised while building the capture sequence. All of these are fatal
/// and stop the run before any interaction; per-row problems are `SkippedRow`s.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("required tag {field} not found on any file; make sure the images carry DateTimeOriginal and GPS tags")]
    MissingField { field: &'static str },

    #[error("no captures with a usable timestamp were found")]
    EmptyInput,

    #[error("exiftool was not found on PATH; install it from https://exiftool.org and make sure `exiftool` is runnable")]
    ToolNotFound,

    #[error("metadata extraction failed: {0}")]
    Extraction(String),

    #[error("failed to read metadata output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A row that was excluded from the capture sequence. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub file: String,
    pub reason: String,
}
