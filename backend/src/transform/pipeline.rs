//! Async entry points for the report transformation.
//!
//! The transform itself is synchronous and CPU-bound; these functions run it
//! on a blocking worker so a server event loop keeps serving while a large
//! export is processed.
//!
//! # Example
//!
//! ```rust,ignore
//! use restoreport::{transform_file, TransformOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = transform_file(Path::new("deals.csv"), TransformOptions::default()).await?;
//!     println!("{} rows, {} errors", result.success_count, result.errors.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::rows::transform_bytes;
use crate::api::logs::{log_debug, log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::BatchResult;
use crate::parser::DEFAULT_DELIMITER;

/// Options for one transform call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Input and output delimiter.
    pub delimiter: u8,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Transform uploaded bytes on a blocking worker.
pub async fn transform_upload(bytes: Vec<u8>, options: TransformOptions) -> PipelineResult<BatchResult> {
    log_info(format!("📖 Reading document ({} bytes)...", bytes.len()));

    let result = tokio::task::spawn_blocking(move || transform_bytes(&bytes, options.delimiter))
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))??;

    print_batch_result(&result);
    Ok(result)
}

/// Read a file and transform it.
pub async fn transform_file(path: &Path, options: TransformOptions) -> PipelineResult<BatchResult> {
    log_info(format!("📄 Processing: {}", path.display()));
    let bytes = tokio::fs::read(path).await?;
    transform_upload(bytes, options).await
}

fn print_batch_result(result: &BatchResult) {
    log_success(format!(
        "Processed {} rows: {} valid, {} skipped",
        result.processed(),
        result.success_count,
        result.errors.len()
    ));

    if !result.missing_columns.is_empty() {
        log_warning(format!("Missing columns: {}", result.missing_columns.join(", ")));
    }
    if result.success_count == 0 {
        log_warning("No valid rows, report contains the placeholder only");
    }
    for err in &result.errors {
        log_debug(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = "Название сделки;Компания;Количество;Сумма;Товар\n\
                       Ресторан 15.03.2024 13:30;ООО Ромашка;5;1000;\n\
                       Ресторан 15.03.2024;Бета;5;1000;\n";

    #[test]
    fn test_default_options() {
        assert_eq!(TransformOptions::default().delimiter, b';');
    }

    #[tokio::test]
    async fn test_transform_upload() {
        let result = transform_upload(DOC.as_bytes().to_vec(), TransformOptions::default())
            .await
            .unwrap();
        assert_eq!(result.success_count, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].to_string().contains("не найдено время"));
    }

    #[tokio::test]
    async fn test_transform_upload_keeps_missing_columns() {
        let doc = "Название сделки;Компания;Количество\nРесторан 15.03.2024 13:30;Альфа;2";
        let result = transform_upload(doc.as_bytes().to_vec(), TransformOptions::default())
            .await
            .unwrap();
        assert_eq!(result.missing_columns, vec!["Сумма"]);
        assert_eq!(result.success_count, 1);
    }

    #[tokio::test]
    async fn test_transform_upload_fatal_encoding() {
        let err = transform_upload(vec![0xFF, 0xFE, 0x00], TransformOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Document(_)));
    }

    #[tokio::test]
    async fn test_transform_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let result = transform_file(file.path(), TransformOptions::default()).await.unwrap();
        assert_eq!(result.processed(), 2);
    }

    #[tokio::test]
    async fn test_transform_file_missing() {
        let err = transform_file(Path::new("/nonexistent/deals.csv"), TransformOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
