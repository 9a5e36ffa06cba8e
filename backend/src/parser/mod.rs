//! Deal export reader: decoding and delimited-text tokenizing.
//!
//! Turns raw upload bytes into [`RawRow`]s. Columns are found by header name;
//! rows shorter than the header are allowed and missing cells read as empty.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use crate::error::{DocumentError, DocumentResult};
use crate::models::{
    RawRow, COL_AMOUNT, COL_COMPANY, COL_GUESTS, COL_ORDER, COL_TITLE, REQUIRED_COLUMNS,
};

/// Default delimiter of deal exports.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Decode upload bytes as UTF-8, dropping a leading BOM.
///
/// Any invalid byte sequence is a fatal [`DocumentError::Encoding`].
pub fn decode_content(bytes: &[u8]) -> DocumentResult<String> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(DocumentError::Encoding);
    }
    Ok(text.into_owned())
}

/// Positions of the required columns in the header, if present.
#[derive(Debug, Clone, Default)]
struct ColumnIndex {
    title: Option<usize>,
    company: Option<usize>,
    guests: Option<usize>,
    amount: Option<usize>,
    order: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            title: find(COL_TITLE),
            company: find(COL_COMPANY),
            guests: find(COL_GUESTS),
            amount: find(COL_AMOUNT),
            order: find(COL_ORDER),
        }
    }

    fn raw_row(&self, record: &StringRecord) -> RawRow {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        RawRow {
            title: cell(self.title).trim().to_string(),
            company: cell(self.company).trim().to_string(),
            guest_count_text: cell(self.guests).trim().to_string(),
            amount_text: cell(self.amount).replace(',', ".").trim().to_string(),
            order_text: cell(self.order).trim().to_string(),
        }
    }
}

/// Streaming reader over the data rows of one document.
///
/// Yields `(row_index, RawRow)` where the header is row 1 and the first data
/// row is row 2. Blank lines are skipped and do not advance the index.
pub struct RowReader<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    columns: ColumnIndex,
    next_row: usize,
}

impl<'a> RowReader<'a> {
    /// Read the header of `text` and prepare to stream data rows.
    pub fn new(text: &'a str, delimiter: u8) -> DocumentResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(b'"')
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(text.as_bytes());

        let columns = ColumnIndex::from_headers(reader.headers()?);

        Ok(Self {
            records: reader.into_records(),
            columns,
            next_row: 2,
        })
    }

    /// Whether the header contains the required column `name`.
    pub fn has_column(&self, name: &str) -> bool {
        let c = &self.columns;
        match name {
            COL_TITLE => c.title.is_some(),
            COL_COMPANY => c.company.is_some(),
            COL_GUESTS => c.guests.is_some(),
            COL_AMOUNT => c.amount.is_some(),
            COL_ORDER => c.order.is_some(),
            _ => false,
        }
    }

    /// Required columns absent from the header, in header-definition order.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .into_iter()
            .filter(|name| !self.has_column(name))
            .collect()
    }
}

impl Iterator for RowReader<'_> {
    type Item = DocumentResult<(usize, RawRow)>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        let row = self.next_row;
        self.next_row += 1;
        Some(Ok((row, self.columns.raw_row(&record))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_rows(text: &str, delimiter: u8) -> DocumentResult<Vec<(usize, RawRow)>> {
        RowReader::new(text, delimiter)?.collect()
    }

    const HEADER: &str = "Название сделки;Компания;Количество;Сумма;Товар";

    #[test]
    fn test_rows_by_header_name() {
        let csv = format!("{}\nРесторан 01.01.2025 12:00;ООО Ромашка;5;1000;Ужин", HEADER);
        let rows = read_rows(&csv, b';').unwrap();

        assert_eq!(rows.len(), 1);
        let (n, row) = &rows[0];
        assert_eq!(*n, 2);
        assert_eq!(row.title, "Ресторан 01.01.2025 12:00");
        assert_eq!(row.company, "ООО Ромашка");
        assert_eq!(row.guest_count_text, "5");
        assert_eq!(row.amount_text, "1000");
        assert_eq!(row.order_text, "Ужин");
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "Сумма;Компания;Лишняя;Название сделки\n12,5;Альфа;x;Ресторан";
        let rows = read_rows(csv, b';').unwrap();
        let (_, row) = &rows[0];

        assert_eq!(row.amount_text, "12.5");
        assert_eq!(row.company, "Альфа");
        assert_eq!(row.title, "Ресторан");
        // Columns absent from the header read as empty.
        assert_eq!(row.guest_count_text, "");
        assert_eq!(row.order_text, "");
    }

    #[test]
    fn test_short_rows_and_trimming() {
        let csv = format!("{}\n  Ресторан  ; Бета ", HEADER);
        let rows = read_rows(&csv, b';').unwrap();
        let (_, row) = &rows[0];

        assert_eq!(row.title, "Ресторан");
        assert_eq!(row.company, "Бета");
        assert_eq!(row.amount_text, "");
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let csv = format!("{}\n\"Ресторан; зал 2\";\"ООО \"\"Ромашка\"\"\";3;\"1 000,50\";", HEADER);
        let rows = read_rows(&csv, b';').unwrap();
        let (_, row) = &rows[0];

        assert_eq!(row.title, "Ресторан; зал 2");
        assert_eq!(row.company, "ООО \"Ромашка\"");
        assert_eq!(row.amount_text, "1 000.50");
    }

    #[test]
    fn test_row_numbers_skip_blank_lines() {
        let csv = format!("{}\na;b;1;1;\n\nc;d;1;1;\n", HEADER);
        let rows = read_rows(&csv, b';').unwrap();
        let numbers: Vec<usize> = rows.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn test_headers_are_trimmed() {
        let csv = " Название сделки ; Компания \nРесторан;Гамма";
        let reader = RowReader::new(csv, b';').unwrap();
        assert!(reader.has_column(COL_TITLE));
        assert!(reader.has_column(COL_COMPANY));
        assert!(!reader.has_column(COL_AMOUNT));
    }

    #[test]
    fn test_missing_columns_listed() {
        let reader = RowReader::new("Название сделки;Компания;Товар\n", b';').unwrap();
        assert_eq!(reader.missing_columns(), vec![COL_GUESTS, COL_AMOUNT]);

        let reader = RowReader::new("Название сделки;Компания;Количество;Сумма", b';').unwrap();
        assert!(reader.missing_columns().is_empty());
    }

    #[test]
    fn test_empty_document_has_no_rows() {
        assert!(read_rows("", b';').unwrap().is_empty());
        assert!(read_rows(HEADER, b';').unwrap().is_empty());
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Компания".as_bytes());
        assert_eq!(decode_content(&bytes).unwrap(), "Компания");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        // "Компания" in windows-1251
        let bytes: &[u8] = &[0xCA, 0xEE, 0xEC, 0xEF, 0xE0, 0xED, 0xE8, 0xFF];
        assert!(matches!(decode_content(bytes), Err(DocumentError::Encoding)));
    }
}
