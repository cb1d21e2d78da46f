use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Pattern not found: {pattern}")]
    PatternNotFound { pattern: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Address {address:#010x} is outside the image")]
    OutOfRange { address: u32 },

    #[error("Access of {len} bytes at offset {offset:#x} exceeds buffer size {size:#x}")]
    Bounds { offset: usize, len: usize, size: usize },

    #[error("No valid gzip member at offset {offset:#x}")]
    GzipFormat { offset: usize },

    #[error("Invalid executable header: {0}")]
    InvalidHeader(String),

    #[error("Record '{key}' has {actual} bytes, expected {expected}")]
    RecordSize {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid SYSTEM.CNF: {0}")]
    SystemConfig(String),

    #[error("Text table entry does not fit its {width}-byte field: {text}")]
    TextTable { text: String, width: usize },

    #[error("Failed to locate code patterns in {image}! Your game version may be unsupported. (step: {step})")]
    UnsupportedVersion { step: String, image: String },

    #[error("Step '{step}' failed on {image}: {source}")]
    StepFailed {
        step: String,
        image: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Optional step '{step}' failed on {image}: {message}")]
    OptionalStepFailed {
        step: String,
        image: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Errors an optional step may turn into a warning.
    ///
    /// Signature and gzip misses point at an unexpected game version. Bounds
    /// and IO failures are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::PatternNotFound { .. } | Error::GzipFormat { .. } | Error::TextTable { .. }
        )
    }

    /// Errors that mean the image does not look like a supported version.
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self, Error::PatternNotFound { .. } | Error::GzipFormat { .. })
    }
}
