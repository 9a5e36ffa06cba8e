//! User-facing presentation of a [`BatchResult`].
//!
//! The summary caption and the error list are plain text sized for chat-style
//! transports, where a single message is limited to a few thousand characters.

use rust_decimal::Decimal;

use crate::models::{money_cell, BatchResult, RowError};

/// Heading of the first error chunk.
pub const ERRORS_HEADING: &str = "‼️ Ошибки:";

/// Marker in front of each row error.
pub const ERROR_MARKER: &str = "🚨";

/// Reply for uploads that are not CSV files.
pub const NOT_CSV_MESSAGE: &str = "⚠️ Нужен файл *.CSV*";

/// Summary caption with the processed row count and the three totals.
pub fn caption(result: &BatchResult) -> String {
    format!(
        "✅ Готово!\n\
         Строк обработано: {}\n\n\
         *Итоги:*\n\
         • без скидки: {} ₽\n\
         • скидка 15%: {} ₽\n\
         • со скидкой: {} ₽",
        result.success_count,
        format_money(result.totals.gross),
        format_money(result.totals.discount),
        format_money(result.totals.net),
    )
}

/// Two decimals with a comma every three digits: `1234567.5` -> `1,234,567.50`.
pub fn format_money(value: Decimal) -> String {
    let cell = money_cell(value);
    let (sign, digits) = match cell.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cell.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}

/// The full error text: heading, blank line, one marked line per row error.
pub fn error_text(errors: &[RowError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let lines: Vec<String> = errors
        .iter()
        .map(|e| format!("{} {}", ERROR_MARKER, e))
        .collect();
    Some(format!("{}\n\n{}", ERRORS_HEADING, lines.join("\n")))
}

/// Split the error text into pieces of at most `limit` characters.
///
/// Pieces are cut on character boundaries, not on line breaks.
pub fn error_chunks(errors: &[RowError], limit: usize) -> Vec<String> {
    let Some(text) = error_text(errors) else {
        return Vec::new();
    };
    let limit = limit.max(1);

    let chars: Vec<char> = text.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}

/// Whether an uploaded file name looks like a CSV export.
pub fn is_csv_file_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowValidationError;
    use crate::models::Totals;
    use rust_decimal_macros::dec;

    fn result_with(totals: Totals, errors: Vec<RowError>, success_count: usize) -> BatchResult {
        BatchResult {
            output_document: Vec::new(),
            rows: Vec::new(),
            errors,
            success_count,
            totals,
            missing_columns: Vec::new(),
        }
    }

    fn missing_company(row: usize) -> RowError {
        RowError::new(row, "Ресторан 01.01.2025 12:00", RowValidationError::MissingCompany)
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(0)), "0.00");
        assert_eq!(format_money(dec!(999.5)), "999.50");
        assert_eq!(format_money(dec!(1000)), "1,000.00");
        assert_eq!(format_money(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_money(dec!(-12345.6)), "-12,345.60");
    }

    #[test]
    fn test_caption() {
        let totals = Totals {
            gross: dec!(1250.50),
            discount: dec!(187.58),
            net: dec!(1062.92),
        };
        let text = caption(&result_with(totals, vec![], 2));

        assert!(text.starts_with("✅ Готово!\nСтрок обработано: 2\n\n*Итоги:*\n"));
        assert!(text.contains("• без скидки: 1,250.50 ₽"));
        assert!(text.contains("• скидка 15%: 187.58 ₽"));
        assert!(text.ends_with("• со скидкой: 1,062.92 ₽"));
    }

    #[test]
    fn test_no_errors_no_chunks() {
        assert!(error_text(&[]).is_none());
        assert!(error_chunks(&[], 4096).is_empty());
    }

    #[test]
    fn test_error_text_layout() {
        let text = error_text(&[missing_company(2), missing_company(5)]).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "‼️ Ошибки:");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "🚨 Стр.2: нет компании — «Ресторан 01.01.2025 12:00»");
        assert!(lines[3].starts_with("🚨 Стр.5:"));
    }

    #[test]
    fn test_chunks_respect_char_limit() {
        let errors: Vec<RowError> = (2..200).map(missing_company).collect();
        let full = error_text(&errors).unwrap();
        let chunks = error_chunks(&errors, 100);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        // Cyrillic text must never be split inside a character.
        assert_eq!(chunks.concat(), full);
    }

    #[test]
    fn test_csv_file_name() {
        assert!(is_csv_file_name("deals.csv"));
        assert!(is_csv_file_name("DEALS.CSV"));
        assert!(!is_csv_file_name("deals.xlsx"));
        assert!(!is_csv_file_name("csv"));
    }
}
