//! Row transformer: deal export text to report document.
//!
//! Every data row either becomes a [`ReportRow`] or a [`RowError`]; a bad row
//! never stops the batch. Only an unreadable document is an `Err`.

use csv::{Writer, WriterBuilder};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{DocumentError, DocumentResult, RowValidationError};
use crate::models::{
    BatchResult, RawRow, ReportRow, RowError, RowErrorKind, Totals, NO_VALID_ROWS, REPORT_HEADER,
    VENUE,
};
use crate::parser::{decode_content, RowReader};
use crate::title::parse_title;

/// Discount applied to every gross amount (15%).
pub const DISCOUNT_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Transform a decoded deal export.
///
/// # Example
/// ```
/// use restoreport::transform;
///
/// let csv = "Название сделки;Компания;Количество;Сумма;Товар\n\
///            Ресторан 15.03.2024 13:30;ООО Ромашка;5;1000;";
/// let result = transform(csv, b';').unwrap();
///
/// assert_eq!(result.success_count, 1);
/// assert_eq!(result.totals.net.to_string(), "850.00");
/// ```
pub fn transform(document: &str, delimiter: u8) -> DocumentResult<BatchResult> {
    let reader = RowReader::new(document, delimiter)?;
    let mut batch = BatchBuilder::new(delimiter, reader.missing_columns());

    for item in reader {
        let (n, raw) = item?;
        let row = match transform_row(n, &raw) {
            Ok(row) => row,
            Err(err) => {
                batch.push_error(err);
                continue;
            }
        };
        match batch.totals.checked_add(&row) {
            Some(totals) => batch.push_row(row, totals)?,
            None => {
                let reason = RowValidationError::AmountOverflow(raw.amount_text.clone());
                batch.push_error(RowError::new(n, raw.title.as_str(), reason));
            }
        }
    }

    batch.finish()
}

/// Decode raw upload bytes (UTF-8) and transform them.
pub fn transform_bytes(bytes: &[u8], delimiter: u8) -> DocumentResult<BatchResult> {
    let text = decode_content(bytes)?;
    transform(&text, delimiter)
}

/// Validate one row and compute its report fields.
///
/// Checks run in a fixed order: company, guest count, title.
pub fn transform_row(n: usize, raw: &RawRow) -> Result<ReportRow, RowError> {
    let fail = |kind: RowErrorKind| RowError::new(n, raw.title.as_str(), kind);

    if raw.company.is_empty() {
        return Err(fail(RowValidationError::MissingCompany.into()));
    }

    let guest_count = parse_guest_count(&raw.guest_count_text).ok_or_else(|| {
        fail(RowValidationError::InvalidGuestCount(raw.guest_count_text.clone()).into())
    })?;

    let parsed = parse_title(&raw.title).map_err(|e| fail(e.into()))?;

    let order = if raw.order_text.is_empty() {
        parsed.fallback_order
    } else {
        raw.order_text.clone()
    };

    let gross_amount = parse_amount(&raw.amount_text);
    let (discount_amount, net_amount) = discount(gross_amount);

    Ok(ReportRow {
        date: parsed.date,
        time: parsed.time,
        venue: VENUE,
        order,
        company: raw.company.clone(),
        guest_count,
        gross_amount,
        discount_amount,
        net_amount,
    })
}

/// Discount and net amount, each rounded to cents (half-to-even).
pub fn discount(amount: Decimal) -> (Decimal, Decimal) {
    let discount = (amount * DISCOUNT_RATE).round_dp(2);
    let net = (amount - discount).round_dp(2);
    (discount, net)
}

/// Parse a guest count: any finite number, truncated, must be positive.
pub fn parse_guest_count(text: &str) -> Option<u32> {
    let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?.trunc();
    if value <= 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

/// Parse an amount (decimal point already normalized).
///
/// Unparseable text is deliberately read as zero rather than an error.
pub fn parse_amount(text: &str) -> Decimal {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

fn report_writer(delimiter: u8) -> Writer<Vec<u8>> {
    WriterBuilder::new().delimiter(delimiter).from_writer(Vec::new())
}

/// Accumulates output rows, errors and totals for one document.
struct BatchBuilder {
    delimiter: u8,
    writer: Option<Writer<Vec<u8>>>,
    rows: Vec<ReportRow>,
    errors: Vec<RowError>,
    totals: Totals,
    missing_columns: Vec<&'static str>,
}

impl BatchBuilder {
    fn new(delimiter: u8, missing_columns: Vec<&'static str>) -> Self {
        Self {
            delimiter,
            writer: None,
            rows: Vec::new(),
            errors: Vec::new(),
            totals: Totals::default(),
            missing_columns,
        }
    }

    /// Write `row` and take `totals` (already including it) as the new sums.
    fn push_row(&mut self, row: ReportRow, totals: Totals) -> DocumentResult<()> {
        // The header goes out with the first valid row only.
        if self.writer.is_none() {
            let mut writer = report_writer(self.delimiter);
            writer.write_record(REPORT_HEADER)?;
            self.writer = Some(writer);
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write_record(row.to_record())?;
        }

        self.totals = totals;
        self.rows.push(row);
        Ok(())
    }

    fn push_error(&mut self, err: RowError) {
        self.errors.push(err);
    }

    fn finish(self) -> DocumentResult<BatchResult> {
        let writer = match self.writer {
            Some(writer) => writer,
            None => {
                let mut writer = report_writer(self.delimiter);
                writer.write_record([NO_VALID_ROWS])?;
                writer
            }
        };

        let output_document = writer
            .into_inner()
            .map_err(|e| DocumentError::Output(e.to_string()))?;

        Ok(BatchResult {
            output_document,
            success_count: self.rows.len(),
            rows: self.rows,
            errors: self.errors,
            totals: self.totals,
            missing_columns: self.missing_columns,
        })
    }
}
