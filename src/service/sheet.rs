//! Spreadsheet rows and best-effort cell coercion.
//!
//! The first non-empty row of the first worksheet is the header. Header names
//! are normalized (trimmed, lowercased, inner spaces to `_`) so `Order Nr` and
//! `order_nr` address the same column.

use crate::error::MarketError;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl From<&Data> for Cell {
    fn from(d: &Data) -> Self {
        match d {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.trim().to_string()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
                .map(Cell::DateTime)
                .unwrap_or(Cell::Empty),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Spreadsheet serial date (days since 1899-12-30, fractional time of day).
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let secs = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(secs))
}

fn parse_datetime_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Parse a query-string date: RFC3339 or a bare `YYYY-MM-DD`.
pub fn parse_query_datetime(s: &str) -> Option<DateTime<Utc>> {
    parse_datetime_text(s.trim())
}

/// Number without a trailing `.0` when integral, so numeric id cells read
/// back as the id the user typed.
fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl Cell {
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(render_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s
                .replace(',', "")
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() < 9.0e15)
            .map(|n| n as i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Number(n) => Some(*n != 0.0),
            Cell::Text(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(true),
                "false" | "no" | "n" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::DateTime(dt) => Some(dt.and_utc()),
            Cell::Text(s) => parse_datetime_text(s),
            Cell::Number(n) => excel_serial_to_datetime(*n).map(|dt| dt.and_utc()),
            _ => None,
        }
    }
}

/// One data row addressed by normalized header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: HashMap<String, Cell>,
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl SheetRow {
    pub fn from_cells<K, C>(cells: impl IntoIterator<Item = (K, C)>) -> Self
    where
        K: AsRef<str>,
        C: Into<Cell>,
    {
        Self {
            cells: cells
                .into_iter()
                .map(|(k, c)| (normalize_header(k.as_ref()), c.into()))
                .collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|c| *c == Cell::Empty)
    }

    fn cell(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&Cell::Empty)
    }

    /// Non-empty text, or `None`.
    pub fn opt_text(&self, column: &str) -> Option<String> {
        self.cell(column).as_text().filter(|s| !s.is_empty())
    }

    pub fn text(&self, column: &str, default: &str) -> String {
        self.opt_text(column).unwrap_or_else(|| default.to_string())
    }

    pub fn opt_f64(&self, column: &str) -> Option<f64> {
        self.cell(column).as_f64()
    }

    /// Money-ish value rounded to two decimals.
    pub fn amount(&self, column: &str, default: f64) -> f64 {
        let v = self.opt_f64(column).unwrap_or(default);
        (v * 100.0).round() / 100.0
    }

    pub fn opt_amount(&self, column: &str) -> Option<f64> {
        self.opt_f64(column).map(|v| (v * 100.0).round() / 100.0)
    }

    pub fn int(&self, column: &str, default: i64) -> i64 {
        self.cell(column).as_i64().unwrap_or(default)
    }

    pub fn opt_int(&self, column: &str) -> Option<i64> {
        self.cell(column).as_i64()
    }

    pub fn flag(&self, column: &str, default: bool) -> bool {
        self.cell(column).as_bool().unwrap_or(default)
    }

    pub fn datetime(&self, column: &str) -> Option<DateTime<Utc>> {
        self.cell(column).as_datetime()
    }
}

/// Read the first worksheet of an xlsx/xlsm/xlsb/xls/ods payload.
pub fn read_workbook(bytes: Vec<u8>) -> Result<Vec<SheetRow>, MarketError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(Vec::new());
    };
    let range = range?;

    let mut rows = range.rows().skip_while(|r| r.iter().all(|c| Cell::from(c) == Cell::Empty));
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header
        .iter()
        .map(|c| Cell::from(c).as_text().map(|h| normalize_header(&h)).unwrap_or_default())
        .collect();

    let parsed = rows
        .map(|row| SheetRow {
            cells: headers
                .iter()
                .zip(row.iter())
                .filter(|(h, _)| !h.is_empty())
                .map(|(h, c)| (h.clone(), Cell::from(c)))
                .collect(),
        })
        .filter(|row| !row.is_blank())
        .collect();
    Ok(parsed)
}
