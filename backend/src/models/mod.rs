//! Domain models for the report pipeline.
//!
//! - [`RawRow`] - one decoded input record
//! - [`ParsedTitle`] - date, time and fallback order extracted from a deal title
//! - [`ReportRow`] - one normalized output record with discount fields
//! - [`RowError`] - a row-scoped failure with its row index
//! - [`Totals`] / [`BatchResult`] - aggregate output of one transform call

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{RowValidationError, TitleFormatError};

// =============================================================================
// Fixed contracts
// =============================================================================

/// Input column holding the free-text deal title.
pub const COL_TITLE: &str = "Название сделки";
/// Input column holding the company name.
pub const COL_COMPANY: &str = "Компания";
/// Input column holding the guest count.
pub const COL_GUESTS: &str = "Количество";
/// Input column holding the gross amount.
pub const COL_AMOUNT: &str = "Сумма";
/// Input column holding the explicit order description.
pub const COL_ORDER: &str = "Товар";

/// Columns a usable export must carry. The order column may be absent.
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_TITLE, COL_COMPANY, COL_GUESTS, COL_AMOUNT];

/// Venue written into every report row.
pub const VENUE: &str = "Ресторан";

/// Order used when neither the row nor the title names one.
pub const DEFAULT_ORDER: &str = "Обед";

/// Output header, in column order.
pub const REPORT_HEADER: [&str; 9] = [
    "Дата",
    "Время",
    "Место",
    "Заказ",
    "Компания",
    "Количество",
    "Сумма, Руб.",
    "Скидка 15%",
    "Сумма за -15%",
];

/// Sole row of the output document when no input row was valid.
pub const NO_VALID_ROWS: &str = "Нет валидных строк";

/// Date layout used in titles (after year expansion) and in the report.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

// =============================================================================
// Input
// =============================================================================

/// One input record, fields already trimmed.
///
/// Missing columns and short rows yield empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub title: String,
    pub company: String,
    pub guest_count_text: String,
    /// Decimal commas already replaced with points.
    pub amount_text: String,
    pub order_text: String,
}

/// Result of parsing a deal title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub date: NaiveDate,
    /// Always `HH:MM`.
    pub time: String,
    pub fallback_order: String,
}

// =============================================================================
// Output
// =============================================================================

/// One validated transaction with computed discount fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(serialize_with = "serialize_report_date")]
    pub date: NaiveDate,
    pub time: String,
    pub venue: &'static str,
    pub order: String,
    pub company: String,
    pub guest_count: u32,
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub net_amount: Decimal,
}

impl ReportRow {
    /// Cells in [`REPORT_HEADER`] order.
    ///
    /// Money is always written with two decimals.
    pub fn to_record(&self) -> [String; 9] {
        [
            self.date.format(DATE_FORMAT).to_string(),
            self.time.clone(),
            self.venue.to_string(),
            self.order.clone(),
            self.company.clone(),
            self.guest_count.to_string(),
            money_cell(self.gross_amount),
            money_cell(self.discount_amount),
            money_cell(self.net_amount),
        ]
    }
}

fn serialize_report_date<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format(DATE_FORMAT))
}

/// Formats a money value with exactly two decimals (`1000` -> `1000.00`).
pub fn money_cell(value: Decimal) -> String {
    let mut v = value.round_dp(2);
    v.rescale(2);
    v.to_string()
}

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowErrorKind {
    Validation(RowValidationError),
    Title(TitleFormatError),
}

impl From<RowValidationError> for RowErrorKind {
    fn from(e: RowValidationError) -> Self {
        RowErrorKind::Validation(e)
    }
}

impl From<TitleFormatError> for RowErrorKind {
    fn from(e: TitleFormatError) -> Self {
        RowErrorKind::Title(e)
    }
}

/// A skipped row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based row index in the source document (header is row 1).
    pub row: usize,
    pub title: String,
    pub kind: RowErrorKind,
}

impl RowError {
    pub fn new(row: usize, title: impl Into<String>, kind: impl Into<RowErrorKind>) -> Self {
        Self {
            row,
            title: title.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            // Validation failures lead with the reason, title failures with the title.
            RowErrorKind::Validation(reason) => {
                write!(f, "Стр.{}: {} — «{}»", self.row, reason, self.title)
            }
            RowErrorKind::Title(reason) => {
                write!(f, "Стр.{}: «{}» — {}", self.row, self.title, reason)
            }
        }
    }
}

impl Serialize for RowError {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Running sums over successful rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub gross: Decimal,
    pub discount: Decimal,
    pub net: Decimal,
}

impl Totals {
    /// Totals with `row` added, or `None` if any sum would overflow.
    pub fn checked_add(&self, row: &ReportRow) -> Option<Totals> {
        Some(Totals {
            gross: self.gross.checked_add(row.gross_amount)?,
            discount: self.discount.checked_add(row.discount_amount)?,
            net: self.net.checked_add(row.net_amount)?,
        })
    }
}

/// Output of one transform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// The report document, UTF-8 encoded.
    pub output_document: Vec<u8>,
    /// Successful rows in encounter order.
    pub rows: Vec<ReportRow>,
    /// One entry per skipped row, in encounter order.
    pub errors: Vec<RowError>,
    pub success_count: usize,
    pub totals: Totals,
    /// Required columns not found in the header; their cells read as empty.
    pub missing_columns: Vec<&'static str>,
}

impl BatchResult {
    /// Rows seen in the document (successes plus skips).
    pub fn processed(&self) -> usize {
        self.success_count + self.errors.len()
    }

    /// Human-readable error messages, one per skipped row.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// The output document as text.
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output_document).into_owned()
    }
}
