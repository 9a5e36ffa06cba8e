//! REST API types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{BatchResult, ReportRow};
use crate::report::{caption, error_chunks};

/// Response sent after an upload was transformed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    pub status: UploadStatus,

    /// Ready-to-send summary text
    pub caption: String,

    pub summary: ReportSummary,

    /// One message per skipped row
    pub errors: Vec<String>,

    /// The error list split for message size limits
    pub error_chunks: Vec<String>,

    /// The report document
    pub output_csv: String,

    pub rows: Vec<ReportRow>,
}

/// `ready` when every row passed, `warning` when some failed, `empty` when none passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Ready,
    Warning,
    Empty,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub processed: usize,
    pub failed: usize,
    pub total_gross: Decimal,
    pub total_discount: Decimal,
    pub total_net: Decimal,
    /// Required columns absent from the uploaded header
    pub missing_columns: Vec<&'static str>,
}

impl UploadResponse {
    pub fn from_result(result: BatchResult, message_limit: usize) -> Self {
        let status = if result.success_count == 0 {
            UploadStatus::Empty
        } else if result.errors.is_empty() {
            UploadStatus::Ready
        } else {
            UploadStatus::Warning
        };

        UploadResponse {
            job_id: Uuid::new_v4().to_string(),
            status,
            caption: caption(&result),
            summary: ReportSummary {
                processed: result.success_count,
                failed: result.errors.len(),
                total_gross: result.totals.gross,
                total_discount: result.totals.discount,
                total_net: result.totals.net,
                missing_columns: result.missing_columns.clone(),
            },
            errors: result.error_messages(),
            error_chunks: error_chunks(&result.errors, message_limit),
            output_csv: result.output_text(),
            rows: result.rows,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "errors": [],
        "rows": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;

    const HEADER: &str = "Название сделки;Компания;Количество;Сумма;Товар";

    #[test]
    fn test_response_from_mixed_batch() {
        let doc = format!(
            "{}\nРесторан 15.03.2024 13:30;ООО Ромашка;5;1000;\nРесторан 15.03.2024 13:30;;5;1000;",
            HEADER
        );
        let result = transform(&doc, b';').unwrap();
        let response = UploadResponse::from_result(result, 4096);

        assert_eq!(response.status, UploadStatus::Warning);
        assert_eq!(response.summary.processed, 1);
        assert_eq!(response.summary.failed, 1);
        assert_eq!(response.error_chunks.len(), 1);
        assert!(response.output_csv.starts_with("Дата;Время;"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["summary"]["totalNet"], "850.00");
        assert_eq!(json["rows"][0]["company"], "ООО Ромашка");
    }

    #[test]
    fn test_response_status_empty() {
        let result = transform(HEADER, b';').unwrap();
        let response = UploadResponse::from_result(result, 4096);
        assert_eq!(response.status, UploadStatus::Empty);
        assert_eq!(response.output_csv, "Нет валидных строк\n");
        assert!(response.error_chunks.is_empty());
    }

    #[test]
    fn test_summary_lists_missing_columns() {
        let result = transform("Название сделки;Компания;Количество\nРесторан 15.03.2024 13:30;Альфа;2", b';')
            .unwrap();
        let json = serde_json::to_value(UploadResponse::from_result(result, 4096)).unwrap();
        assert_eq!(json["summary"]["missingColumns"], json!(["Сумма"]));
        assert_eq!(json["summary"]["totalGross"], "0");
    }

    #[test]
    fn test_error_response_shape() {
        let value = error_response("boom");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "boom");
    }
}
