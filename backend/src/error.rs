//! Error types for the report transformation pipeline.
//!
//! - [`TitleFormatError`] - deal title could not be parsed (row-scoped)
//! - [`RowValidationError`] - required row field is missing or invalid (row-scoped)
//! - [`DocumentError`] - document cannot be decoded or tokenized (fatal)
//! - [`PipelineError`] - async orchestration errors
//! - [`ServerError`] - HTTP layer errors
//! - [`ConfigError`] - invalid environment configuration
//!
//! Row-scoped errors never leave the transformer as `Err`: they are
//! collected into [`crate::models::BatchResult::errors`]. Only
//! [`DocumentError`] and the layers above it abort a call.

use thiserror::Error;

// =============================================================================
// Title Errors
// =============================================================================

/// Reasons a deal title cannot be turned into a date, a time and an order.
///
/// The `Display` text is the human-readable reason appended to the row
/// message, so it stays in the language of the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleFormatError {
    /// The word "ресторан" does not appear in the title.
    #[error("не найдено слово «Ресторан»")]
    VenueMarkerMissing,

    /// No `DD.MM.YYYY` / `DD.MM.YY` substring.
    #[error("не найдена дата")]
    DateNotFound,

    /// The matched digits are not a calendar date (e.g. 31.04.2024).
    #[error("некорректная дата «{0}»")]
    InvalidDate(String),

    /// No time after the matched date.
    #[error("не найдено время")]
    TimeNotFound,
}

// =============================================================================
// Row Validation Errors
// =============================================================================

/// Per-row field validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowValidationError {
    /// The company column is empty.
    #[error("нет компании")]
    MissingCompany,

    /// The guest count is not a number or not positive.
    #[error("неправильное количество «{0}»")]
    InvalidGuestCount(String),

    /// Adding the amount would push the batch totals past `Decimal::MAX`.
    #[error("сумма «{0}» не помещается в итоги")]
    AmountOverflow(String),
}

// =============================================================================
// Document Errors (fatal)
// =============================================================================

/// The input document is structurally unreadable.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Bytes are not valid UTF-8.
    #[error("Cannot decode document as UTF-8 (invalid byte sequence)")]
    Encoding,

    /// Tokenizer failure.
    ///
    /// The reader is flexible and runs over already-decoded text, so in
    /// practice this only fires for a non-ASCII delimiter byte that splits
    /// a multi-byte character.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Output buffer could not be finalized.
    #[error("Cannot build output document: {0}")]
    Output(String),
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Errors from the async entry points in [`crate::transform::pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fatal document error.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Failed to read the input file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking worker panicked or was cancelled.
    #[error("Transform worker failed: {0}")]
    Worker(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Socket bind or serve failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Invalid environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for title parsing.
pub type TitleResult<T> = Result<T, TitleFormatError>;

/// Result type for document-level operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
