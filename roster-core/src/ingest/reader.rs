//! Decode uploaded CSV and workbook files into [`TabularSource`]s.

use super::table::{SheetContent, Table, TabularSource};
use crate::record::Cell;
use crate::{Error, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Strings read as missing values.
const NA_VALUES: &[&str] = &["", "nan", "na", "n/a", "null", "none", "#n/a"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Workbook,
}

impl FileKind {
    /// Detect the kind from a filename, restricted to `allowed` extensions.
    pub fn from_filename(filename: &str, allowed: &[String]) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if ext.is_empty() || !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
            return Err(Error::invalid(format!(
                "File type not allowed. Allowed types: {}",
                allowed.join(", ")
            )));
        }
        Ok(if ext == "csv" { FileKind::Csv } else { FileKind::Workbook })
    }
}

/// Decode `bytes` of the given kind.
///
/// Workbooks yield only their first worksheet as a single table unless
/// `all_sheets` is set.
pub fn read_source(kind: FileKind, bytes: &[u8], all_sheets: bool) -> Result<TabularSource> {
    match kind {
        FileKind::Csv => Ok(TabularSource::Single(read_csv(bytes)?)),
        FileKind::Workbook => read_workbook(bytes, all_sheets),
    }
}

/// Read a file from disk, detecting its kind from the extension.
pub fn read_path(path: &Path, allowed: &[String], all_sheets: bool) -> Result<TabularSource> {
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let kind = FileKind::from_filename(filename, allowed)?;
    let bytes = std::fs::read(path)?;
    read_source(kind, &bytes, all_sheets)
}

pub fn read_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::InputShape(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let headers = dedupe_headers(raw_headers);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            Error::InputShape(format!("Unreadable CSV row {}: {}", line + 2, e))
        })?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(infer_cell).collect());
    }

    Ok(Table::new(headers, rows))
}

fn read_workbook(bytes: &[u8], all_sheets: bool) -> Result<TabularSource> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::InputShape(format!("Unreadable workbook: {}", e)))?;

    let names = workbook.sheet_names();
    if !all_sheets {
        let first = names
            .first()
            .ok_or_else(|| Error::InputShape("Workbook contains no worksheets".to_string()))?;
        let range = workbook
            .worksheet_range(first)
            .map_err(|e| Error::InputShape(format!("Unreadable worksheet '{}': {}", first, e)))?;
        return Ok(TabularSource::Single(range_to_table(&range)));
    }

    let mut sheets = IndexMap::new();
    for name in names {
        let content = match workbook.worksheet_range(&name) {
            Ok(range) => SheetContent::Table(range_to_table(&range)),
            Err(e) => SheetContent::Other(format!("unreadable worksheet ({})", e)),
        };
        sheets.insert(name, content);
    }
    Ok(TabularSource::Sheeted(sheets))
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Table::default();
    };
    let headers = dedupe_headers(header_row.iter().map(header_text).collect());

    let rows = rows
        .filter(|row| !row.iter().all(|d| matches!(d, Data::Empty)))
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();
    Table::new(headers, rows)
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2` suffixes.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(index, header)| {
            let header =
                if header.trim().is_empty() { format!("Unnamed: {}", index) } else { header };
            let count = seen.entry(header.clone()).or_insert(0);
            let name = if *count == 0 { header } else { format!("{}.{}", header, count) };
            *count += 1;
            name
        })
        .collect()
}

/// Type a CSV field: missing markers, integers, floats, booleans, else text.
///
/// Integers with a leading zero stay text so phone numbers keep their digits.
fn infer_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if NA_VALUES.contains(&trimmed.to_lowercase().as_str()) {
        return Cell::Empty;
    }

    let unsigned = trimmed.trim_start_matches(|c: char| c == '-' || c == '+');
    let leading_zero =
        unsigned.len() > 1 && unsigned.starts_with('0') && !unsigned.starts_with("0.");
    if !leading_zero {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Cell::Float(f);
            }
        }
    }

    match trimmed {
        "True" | "TRUE" | "true" => Cell::Bool(true),
        "False" | "FALSE" | "false" => Cell::Bool(false),
        _ => Cell::Text(raw.to_string()),
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Cell::Int(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(when) => Cell::Other {
                kind: "datetime".to_string(),
                repr: when.format("%Y-%m-%dT%H:%M:%S").to_string(),
            },
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => Cell::Other { kind: "datetime".to_string(), repr: s.clone() },
        Data::DurationIso(s) => Cell::Other { kind: "duration".to_string(), repr: s.clone() },
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
