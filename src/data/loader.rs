use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::{debug, info};
use serde_json::Value as JsonValue;

use super::model::{parse_finite, unify_column, CellValue, Column, Table};
use crate::error::{Result, TableError};

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// File families the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-delimited text with a header row.
    Delimited,
    /// Excel / OpenDocument workbook; only the first sheet is read.
    Spreadsheet,
    /// Records-oriented JSON array.
    JsonRecords,
}

impl SourceFormat {
    /// Detect the format from the filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            "json" => Ok(SourceFormat::JsonRecords),
            other => Err(TableError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse uploaded bytes into a [`Table`].  Dispatch by extension of `filename`.
///
/// Supported formats:
/// * `.csv`  – comma-delimited, first row is the header
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first sheet, first row is the header
/// * `.json` – `[{ "Name": "AAA", "Price": 10 }, ...]`
///
/// Header names are kept verbatim. Duplicate names are a parse error.
pub fn load(bytes: &[u8], filename: &str) -> Result<Table> {
    let format = SourceFormat::from_filename(filename)?;
    debug!("loading {filename} ({} bytes) as {format:?}", bytes.len());

    let table = match format {
        SourceFormat::Delimited => load_csv(bytes)?,
        SourceFormat::Spreadsheet => load_spreadsheet(bytes)?,
        SourceFormat::JsonRecords => load_json(bytes)?,
    };

    info!(
        "loaded {filename}: {} rows x {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Every record must
/// have as many fields as the header.
///
/// A field written in quotes is always text, so `"007"` stays a string while
/// `007` is read as a number.
fn load_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(TableError::Parse("CSV has no header row".to_string()));
    }

    let mut raw: Vec<Vec<RawCell>> = vec![Vec::new(); headers.len()];
    let mut record = csv::StringRecord::new();
    let mut row_no = 0usize;
    loop {
        let start = reader.position().byte() as usize;
        let more = reader
            .read_record(&mut record)
            .map_err(|e| TableError::Parse(format!("CSV row {}: {e}", row_no + 1)))?;
        if !more {
            break;
        }
        let end = (reader.position().byte() as usize).min(bytes.len());
        let quoted = quoted_fields(&bytes[start.min(end)..end]);
        for (col_idx, value) in record.iter().enumerate() {
            raw[col_idx].push(RawCell {
                text: value.to_string(),
                quoted: quoted.get(col_idx).copied().unwrap_or(false),
            });
        }
        row_no += 1;
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_text_column(cells)))
        .collect();
    Table::new(columns)
}

/// One delimited field as read, before typing.
#[derive(Debug, Clone)]
struct RawCell {
    text: String,
    quoted: bool,
}

/// For each field of one raw record, whether it opens with a quote.
///
/// `raw` is the record's source bytes as delimited by the csv reader; any
/// line terminator left over from the previous record is skipped.
fn quoted_fields(raw: &[u8]) -> Vec<bool> {
    let first = raw
        .iter()
        .position(|b| *b != b'\r' && *b != b'\n')
        .unwrap_or(raw.len());
    let raw = &raw[first..];

    let mut flags = Vec::new();
    let mut i = 0;
    loop {
        let quoted = raw.get(i) == Some(&b'"');
        flags.push(quoted);
        if quoted {
            i += 1;
            while i < raw.len() {
                match (raw[i], raw.get(i + 1)) {
                    (b'"', Some(b'"')) => i += 2,
                    (b'"', _) => {
                        i += 1;
                        break;
                    }
                    _ => i += 1,
                }
            }
        }
        while i < raw.len() && raw[i] != b',' && raw[i] != b'\n' && raw[i] != b'\r' {
            i += 1;
        }
        if i >= raw.len() || raw[i] != b',' {
            break;
        }
        i += 1;
    }
    flags
}

/// Type a column of raw text cells.
///
/// Empty cells are missing. If every remaining cell is an unquoted integer
/// the column is integer; if every one is an unquoted finite number it is
/// float; otherwise the whole column keeps its original text.
fn infer_text_column(cells: Vec<RawCell>) -> Vec<CellValue> {
    let mut all_int = true;
    let mut all_num = true;
    for cell in cells.iter().filter(|c| !c.text.is_empty()) {
        if cell.quoted {
            all_int = false;
            all_num = false;
            break;
        }
        if cell.text.parse::<i64>().is_err() {
            all_int = false;
            if parse_finite(&cell.text).is_none() {
                all_num = false;
                break;
            }
        }
    }

    cells
        .into_iter()
        .map(|RawCell { text, .. }| {
            if text.is_empty() {
                CellValue::Null
            } else if all_int {
                text.parse::<i64>().map_or(CellValue::Null, CellValue::Integer)
            } else if all_num {
                parse_finite(&text).map_or(CellValue::Null, CellValue::Float)
            } else {
                CellValue::String(text)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of a workbook; the first row holds the column names.
fn load_spreadsheet(bytes: &[u8]) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::Parse("workbook has no sheets".to_string()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| TableError::Parse("first sheet is empty".to_string()))?;
    let headers: Vec<String> = header.iter().map(header_text).collect();
    debug!("spreadsheet header: {headers:?}");

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(col_idx).map_or(CellValue::Null, sheet_cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, unify_column(values)))
        .collect();
    Table::new(columns)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => sheet_cell(other).to_field(),
    }
}

fn sheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::String(b.to_string()),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Name": "AAA", "Price": 10 },
///   { "Name": "BBB", "Price": 20.5 }
/// ]
/// ```
///
/// Columns appear in first-seen key order; a key missing from a record is a
/// missing cell.
fn load_json(bytes: &[u8]) -> Result<Table> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| TableError::Parse("expected top-level JSON array".to_string()))?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| TableError::Parse(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map_or(CellValue::Null, json_cell))
                .collect();
            Column::new(name, unify_column(values))
        })
        .collect();
    Table::new(columns)
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.is_empty() => CellValue::Null,
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::String(b.to_string()),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}
