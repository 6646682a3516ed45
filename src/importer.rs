use std::io::Cursor;

use calamine::{Data, Reader};
use chrono::NaiveDate;

use crate::error::{FinilyticsError, Result};
use crate::models::{Cell, Table};

// ---------------------------------------------------------------------------
// Value parsing helpers
// ---------------------------------------------------------------------------

/// Parse a monetary or plain numeric string. Tolerates currency symbols,
/// thousands separators, stray quotes and parenthesized negatives:
/// "$1,234.56" → 1234.56, "(500.00)" → -500.0. Non-finite values ("NaN",
/// "inf") are rejected so they cannot leak into amounts.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace(['$', '€', '"'], "");
    let s = s.trim();
    let (s, negative) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (s, false),
    };
    let value: f64 = s.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Try the date formats seen in these documents, ISO first, then
/// day-first (Spanish-locale exports), then month-first.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial as i64))
}

// ---------------------------------------------------------------------------
// Decoding — bytes + filename → Table
// ---------------------------------------------------------------------------

/// Decode an uploaded document into a table. Dispatch is by filename
/// extension; anything outside csv/xlsx/xls is rejected up front.
pub fn decode_document(bytes: &[u8], filename: &str) -> Result<Table> {
    match extension(filename).as_deref() {
        Some("csv") => decode_csv(bytes),
        Some("xlsx") | Some("xls") => decode_workbook(bytes),
        _ => Err(FinilyticsError::UnsupportedFormat(filename.to_string())),
    }
}

fn extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

fn decode_csv(bytes: &[u8]) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = rdr.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(FinilyticsError::Decode("empty document".to_string())),
    };
    let names: Vec<String> = header.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in records {
        let Ok(record) = result else { continue };
        rows.push(record.iter().map(coerce_text_cell).collect());
    }
    Ok(Table::new(names, rows))
}

fn decode_workbook(bytes: &[u8]) -> Result<Table> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| FinilyticsError::Decode(format!("failed to open workbook: {e}")))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| FinilyticsError::Decode("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| FinilyticsError::Decode(format!("failed to read sheet '{sheet}': {e}")))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| FinilyticsError::Decode("empty document".to_string()))?;
    let names: Vec<String> = header.iter().map(|data| data.to_string()).collect();
    let parsed: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(coerce_sheet_cell).collect())
        .collect();
    Ok(Table::new(names, parsed))
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

fn coerce_text_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if let Some(n) = parse_numeric(trimmed) {
        return Cell::Number(n);
    }
    if let Some(date) = parse_date(trimmed) {
        return Cell::Date(date);
    }
    Cell::Text(trimmed.to_string())
}

fn coerce_sheet_cell(data: &Data) -> Cell {
    match data {
        Data::Float(f) if f.is_finite() => Cell::Number(*f),
        Data::Float(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => coerce_text_cell(s),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => Cell::Date(date),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) => {
            let day = s.split('T').next().unwrap_or(s);
            match parse_date(day) {
                Some(date) => Cell::Date(date),
                None => Cell::Text(s.clone()),
            }
        }
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}
