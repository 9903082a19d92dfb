use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv`     – header row, cell types guessed per field
/// * `.json`    – `[{ "Scenario": "...", "2020": 1.5, ... }, ...]`
/// * `.parquet` – scalar columns (strings, ints, floats, bools)
pub fn load_file(path: &Path) -> Result<Table> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;
    range_to_table(&range)
}

/// Read the first worksheet of an in-memory `.xlsx` payload.
pub fn load_xlsx_bytes(bytes: &[u8]) -> Result<Table> {
    read_first_sheet(Cursor::new(bytes))
}

fn read_first_sheet<RS: Read + Seek>(reader: RS) -> Result<Table> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader).context("opening xlsx payload")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;
    range_to_table(&range)
}

fn range_to_table(range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let header = dedupe_headers(
        header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| header_name(cell, i)),
    );

    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(Table::from_rows(header, body)?)
}

/// Repeated header names get a `.1`, `.2`, ... suffix so every column stays
/// addressable: `[X, X, Y]` becomes `[X, X.1, Y]`.
fn dedupe_headers(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();
    for name in names {
        let mut unique = name.clone();
        if used.contains(&unique) {
            let n = repeats.entry(name.clone()).or_insert(0);
            loop {
                *n += 1;
                unique = format!("{name}.{n}");
                if !used.contains(&unique) {
                    break;
                }
            }
            log::warn!("duplicate column '{name}' renamed to '{unique}'");
        }
        used.insert(unique.clone());
        out.push(unique);
    }
    out
}

/// Column names: numeric headers such as `2020` are written as integers.
fn header_name(cell: &Data, index: usize) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Empty => format!("Unnamed: {index}"),
        other => other.to_string(),
    }
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let header = dedupe_headers(
        reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.to_string()),
    );

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::parse_guess).collect());
    }

    Ok(Table::from_rows(header, rows)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Scenario": "NZE", "Unit": "tCO2e", "2020": 13.2, "2025": 10.1 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; keys missing from a record are null.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut header: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            header
                .iter()
                .map(|key| obj.get(key).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(Table::from_rows(header, rows)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
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
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Column types without a direct
/// mapping are rendered as text.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let mut columns: Vec<Column> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col, array) in columns.iter_mut().zip(batch.columns()) {
            col.values
                .extend((0..batch.num_rows()).map(|row| extract_cell(array, row)));
        }
    }

    Ok(Table::new(columns)?)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<StringArray>() {
        return CellValue::String(arr.value(row).to_string());
    }
    if let Some(arr) = any.downcast_ref::<LargeStringArray>() {
        return CellValue::String(arr.value(row).to_string());
    }
    if let Some(arr) = any.downcast_ref::<Int32Array>() {
        return CellValue::Integer(i64::from(arr.value(row)));
    }
    if let Some(arr) = any.downcast_ref::<Int64Array>() {
        return CellValue::Integer(arr.value(row));
    }
    if let Some(arr) = any.downcast_ref::<Float32Array>() {
        return CellValue::Float(f64::from(arr.value(row)));
    }
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        return CellValue::Float(arr.value(row));
    }
    if let Some(arr) = any.downcast_ref::<BooleanArray>() {
        return CellValue::Bool(arr.value(row));
    }
    match arrow::util::display::array_value_to_string(col, row) {
        Ok(text) => CellValue::String(text),
        Err(e) => {
            log::warn!("unreadable {:?} cell at row {row}: {e}", col.data_type());
            CellValue::Null
        }
    }
}
