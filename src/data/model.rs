use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a spreadsheet column can hold.
/// Filters and distinct-value sets need `CellValue` to be `Ord` and `Hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord/Hash so CellValue can live in BTreeSet / HashSet --
// Equality follows `cmp` (floats by `total_cmp`), which keeps it consistent
// with the bitwise hash.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// The text form used for matching: floats use shortest round-trip
/// formatting and nulls render as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for aggregation. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Lower-cased text form, the key used by case-insensitive filters.
    pub fn match_key(&self) -> String {
        self.to_string().to_lowercase()
    }

    /// Guess the type of a raw text cell (CSV fields, form inputs).
    pub fn parse_guess(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            // "NaN" / "nan" mark a missing number.
            if f.is_nan() {
                return CellValue::Null;
            }
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of a table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – ordered, uniquely named, row-aligned columns
// ---------------------------------------------------------------------------

/// An immutable column-oriented table. Every transformation returns a new
/// `Table`; nothing mutates one in place after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());

        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
            if col.values.len() != n_rows {
                return Err(EngineError::InvalidInput(format!(
                    "column '{}' has {} rows, expected {n_rows}",
                    col.name,
                    col.values.len()
                )));
            }
        }

        Ok(Table { columns, n_rows })
    }

    /// Build a table from a header and row-major records. Short records are
    /// padded with nulls; long ones are an error.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let width = header.len();
        let mut columns: Vec<Column> = header
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(EngineError::InvalidInput(format!(
                    "row {row_no} has {} cells but the header has {width}",
                    row.len()
                )));
            }
            let mut cells = row.into_iter();
            for col in &mut columns {
                col.values.push(cells.next().unwrap_or(CellValue::Null));
            }
        }

        Table::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Cell at (`row`, column index). Panics on out-of-range indices like slice indexing.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.columns[col].values[row]
    }

    /// Cells of one row in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.columns.iter().map(move |c| &c.values[row])
    }

    /// New table with the given rows (by index, in the given order).
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), indices.iter().map(|&i| c.values[i].clone()).collect()))
            .collect();
        Table {
            columns,
            n_rows: indices.len(),
        }
    }

    /// First `n` rows (or all of them).
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take_rows(&indices)
    }

    /// New table with exactly the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name)
                    .cloned()
                    .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// New table without the named columns. Unknown names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        Table {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// Distinct text values of a column in first-appearance order.
    /// An unknown column yields an empty list.
    pub fn distinct_text(&self, name: &str) -> Vec<String> {
        let Some(col) = self.column(name) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        col.values
            .iter()
            .map(|v| v.to_string())
            .filter(|s| seen.insert(s.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("Scenario", vec!["A".into(), "B".into(), "A".into()]),
            Column::new("2020", vec![1i64.into(), 2.5f64.into(), CellValue::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("a", vec![CellValue::Null]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![Column::new("a", vec![]), Column::new("a", vec![])]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn from_rows_pads_short_records() {
        let t = Table::from_rows(
            vec!["x".into(), "y".into()],
            vec![vec!["1".into()], vec!["2".into(), "3".into()]],
        )
        .unwrap();
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.cell(0, 1), &CellValue::Null);
        assert_eq!(t.cell(1, 1), &CellValue::from("3"));
    }

    #[test]
    fn text_form_of_cells() {
        assert_eq!(CellValue::Float(10.0).to_string(), "10");
        assert_eq!(CellValue::Float(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::from("tCO2e").match_key(), "tco2e");
    }

    #[test]
    fn parse_guess_types() {
        assert_eq!(CellValue::parse_guess(""), CellValue::Null);
        assert_eq!(CellValue::parse_guess("2020"), CellValue::Integer(2020));
        assert_eq!(CellValue::parse_guess("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::parse_guess("true"), CellValue::Bool(true));
        assert_eq!(CellValue::parse_guess("IEA"), CellValue::from("IEA"));
        assert_eq!(CellValue::parse_guess("NaN"), CellValue::Null);
        assert_eq!(CellValue::parse_guess("nan"), CellValue::Null);
    }

    #[test]
    fn equality_agrees_with_hashing() {
        let nan = CellValue::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(CellValue::Float(0.0), CellValue::Float(-0.0));

        let set: HashSet<CellValue> = [
            CellValue::Float(0.0),
            CellValue::Float(-0.0),
            CellValue::Float(f64::NAN),
            CellValue::Float(f64::NAN),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn select_and_distinct() {
        let t = sample();
        let s = t.select(&["2020", "Scenario"]).unwrap();
        assert_eq!(s.column_names(), vec!["2020", "Scenario"]);
        assert!(t.select(&["Unit"]).is_err());
        assert_eq!(t.distinct_text("Scenario"), vec!["A", "B"]);
        assert!(t.distinct_text("Unit").is_empty());
    }

    #[test]
    fn take_rows_and_head() {
        let t = sample();
        let picked = t.take_rows(&[2, 0]);
        assert_eq!(picked.n_rows(), 2);
        assert_eq!(picked.cell(0, 1), &CellValue::Null);
        assert_eq!(t.head(10).n_rows(), 3);
        assert_eq!(t.head(1).n_rows(), 1);
    }

    #[test]
    fn tables_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Table>();
    }

    #[test]
    fn nan_is_not_numeric() {
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::from("3").as_f64(), None);
    }
}
