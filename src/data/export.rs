use rust_xlsxwriter::{Workbook, Worksheet};

use super::model::{CellValue, Table};
use crate::error::{EngineError, Result};

// Excel worksheet limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Download formats offered for a filtered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "application/vnd.ms-excel",
            ExportFormat::Csv => "text/csv",
        }
    }

    /// Serialize a table in this format.
    pub fn write(self, table: &Table) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Xlsx => to_xlsx(table),
            ExportFormat::Csv => to_csv(table),
        }
    }
}

/// `"<dataset>_filtered_data.<ext>"`
pub fn export_file_name(dataset: &str, format: ExportFormat) -> String {
    format!("{dataset}_filtered_data.{}", format.extension())
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

/// Serialize a table as a single-sheet workbook: a header row of column
/// names, then one row per table row. No index column. Nulls stay blank.
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>> {
    if table.n_rows() + 1 > MAX_ROWS || table.n_cols() > MAX_COLS {
        return Err(EngineError::Export(format!(
            "{} rows x {} columns exceeds the worksheet limit",
            table.n_rows(),
            table.n_cols()
        )));
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (c, column) in table.columns().iter().enumerate() {
        let col = c as u16;
        sheet.write_string(0, col, column.name.as_str())?;
        for (r, value) in column.values.iter().enumerate() {
            write_cell(sheet, r as u32 + 1, col, value).map_err(|e| {
                EngineError::Export(format!("row {r}, column '{}': {e}", column.name))
            })?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    log::info!(
        "exported {} rows x {} columns to xlsx ({} bytes)",
        table.n_rows(),
        table.n_cols(),
        bytes.len()
    );
    Ok(bytes)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::String(s) => {
            sheet.write_string(row, col, s.as_str())?;
        }
        CellValue::Integer(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(v) if v.is_finite() => {
            sheet.write_number(row, col, *v)?;
        }
        // NaN is a missing number and stays blank, like a null.
        CellValue::Float(v) if v.is_nan() => {}
        CellValue::Float(v) => {
            return Err(EngineError::Export(format!("unsupported cell value {v}")));
        }
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Null => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Serialize a table as CSV with a header record. Nulls are empty fields.
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in 0..table.n_rows() {
        writer.write_record(table.row(row).map(|v| v.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| EngineError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn small() -> Table {
        Table::new(vec![
            Column::new("Scenario", vec!["NZE".into(), "APS, high".into()]),
            Column::new("2020", vec![10i64.into(), CellValue::Null]),
            Column::new("Flag", vec![CellValue::Bool(true), CellValue::Bool(false)]),
        ])
        .unwrap()
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = to_xlsx(&small()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn non_finite_float_fails_whole_export() {
        let t = Table::new(vec![Column::new("v", vec![1.0f64.into(), f64::INFINITY.into()])]).unwrap();
        let err = to_xlsx(&t).unwrap_err();
        assert!(matches!(err, EngineError::Export(_)));
    }

    #[test]
    fn nan_is_written_as_a_blank_cell() {
        let t = Table::new(vec![Column::new("v", vec![f64::NAN.into(), 2.0f64.into()])]).unwrap();
        let back = crate::data::loader::load_xlsx_bytes(&to_xlsx(&t).unwrap()).unwrap();
        assert_eq!(back.n_rows(), 2);
        assert_eq!(back.cell(0, 0), &CellValue::Null);
        assert_eq!(back.cell(1, 0).as_f64(), Some(2.0));
    }

    #[test]
    fn csv_layout() {
        let bytes = to_csv(&small()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Scenario,2020,Flag\nNZE,10,true\n\"APS, high\",,false\n");
    }

    #[test]
    fn file_names_and_mime() {
        assert_eq!(
            export_file_name("Power-Sector", ExportFormat::Xlsx),
            "Power-Sector_filtered_data.xlsx"
        );
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
    }
}
