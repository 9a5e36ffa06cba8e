//! # Restoreport - restaurant deal report generation
//!
//! Restoreport turns a CRM deal export (semicolon-separated CSV) into a
//! restaurant report with a 15% discount column and totals.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Deal CSV   │────▶│   Parser    │────▶│    Rows     │────▶│ Report CSV  │
//! │   (UTF-8)   │     │ (by header) │     │ (title+sum) │     │ + errors    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use restoreport::{transform, caption};
//!
//! let csv = "Название сделки;Компания;Количество;Сумма;Товар\n\
//!            Ресторан 15.03.2024 13:30;ООО Ромашка;5;1000;";
//! let result = transform(csv, b';').unwrap();
//!
//! assert_eq!(result.success_count, 1);
//! assert!(caption(&result).contains("850.00"));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Input, output and batch models
//! - [`title`] - Deal title parser
//! - [`parser`] - Decoding and CSV reading
//! - [`transform`] - Row transformer and async pipeline
//! - [`report`] - Caption and error message formatting
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server and log stream

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;
pub mod title;

// Transformation
pub mod transform;

// Presentation
pub mod report;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, DocumentError, PipelineError, RowValidationError, ServerError, TitleFormatError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{BatchResult, ParsedTitle, RawRow, ReportRow, RowError, RowErrorKind, Totals};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_content, RowReader, DEFAULT_DELIMITER};
pub use title::parse_title;

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::rows::{discount, transform, transform_bytes, transform_row, DISCOUNT_RATE};
pub use transform::pipeline::{transform_file, transform_upload, TransformOptions};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{caption, error_chunks, error_text, format_money, is_csv_file_name};

// =============================================================================
// Re-exports - Config / API
// =============================================================================

pub use config::Config;
pub use api::types::{error_response, ReportSummary, UploadResponse, UploadStatus};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
