//! Error types for `VelesDB`.
//!
//! A single error enum covers every operation in the crate. Each variant
//! carries a stable `VELES-0xx` code so adapters (CLI, HTTP) can surface a
//! consistent identifier regardless of the underlying message text.


use thiserror::Error;

/// Result type alias for `VelesDB` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `VelesDB` operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad dimension, empty id, unknown metric, malformed filter, `k` out of range (VELES-001).
    #[error("[VELES-001] Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown collection or vector id (VELES-002).
    #[error("[VELES-002] Not found: {0}")]
    NotFound(String),

    /// Collection name already taken on create (VELES-003).
    #[error("[VELES-003] Already exists: {0}")]
    AlreadyExists(String),

    /// Vector length does not match the collection's configured dimensions (VELES-004).
    #[error("[VELES-004] Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// HNSW node count would exceed the configured capacity (VELES-005).
    #[error("[VELES-005] Index full: {0}")]
    IndexFull(String),

    /// Checksum mismatch in a page or WAL record at read time (VELES-006).
    #[error("[VELES-006] Corruption detected: {0}")]
    Corruption(String),

    /// Underlying storage failure (VELES-007).
    #[error("[VELES-007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Deadline exceeded before any result could be produced (VELES-008).
    #[error("[VELES-008] Operation timed out")]
    Timeout,

    /// Caller's cancellation handle fired (VELES-009).
    #[error("[VELES-009] Operation canceled")]
    Canceled,

    /// Invalid configuration, e.g. page size not a power of two (VELES-010).
    #[error("[VELES-010] Configuration error: {0}")]
    Config(String),

    /// Serialization failure outside the wire formats fixed by the on-disk
    /// layout, e.g. the HNSW index snapshot or the collection descriptor (VELES-011).
    #[error("[VELES-011] Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns the stable error code, e.g. `"VELES-001"`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "VELES-001",
            Self::NotFound(_) => "VELES-002",
            Self::AlreadyExists(_) => "VELES-003",
            Self::DimensionMismatch { .. } => "VELES-004",
            Self::IndexFull(_) => "VELES-005",
            Self::Corruption(_) => "VELES-006",
            Self::Io(_) => "VELES-007",
            Self::Timeout => "VELES-008",
            Self::Canceled => "VELES-009",
            Self::Config(_) => "VELES-010",
            Self::Serialization(_) => "VELES-011",
        }
    }

    /// Returns true if a caller may usefully retry the operation.
    ///
    /// Corruption requires intervention (rebuild or restore); everything
    /// else leaves the store in a state where retrying is safe.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Corruption(_))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}
