use serde::{Deserialize, Serialize};

use super::model::Table;
use crate::error::Result;

/// A column is a year column when its name is purely decimal digits.
pub fn is_year_column(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Year columns of a table as `(year, column name)`, ascending by year.
pub fn year_columns(table: &Table) -> Vec<(u32, String)> {
    let mut years: Vec<(u32, String)> = table
        .columns()
        .iter()
        .filter(|c| is_year_column(&c.name))
        .filter_map(|c| c.name.parse::<u32>().ok().map(|y| (y, c.name.clone())))
        .collect();
    years.sort_by_key(|(y, _)| *y);
    years
}

/// Inclusive year bounds with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: u32,
    pub end: u32,
    /// Set when the requested end preceded the start and was reset.
    pub was_clamped: bool,
}

impl YearRange {
    /// Build a range, resetting `end` to `start` when the bounds are inverted.
    pub fn clamped(start: u32, end: u32) -> Self {
        if end < start {
            log::warn!("end year {end} precedes start year {start}; clamping end to {start}");
            YearRange {
                start,
                end: start,
                was_clamped: true,
            }
        } else {
            YearRange {
                start,
                end,
                was_clamped: false,
            }
        }
    }

    pub fn contains(&self, year: u32) -> bool {
        self.start <= year && year <= self.end
    }

    /// The full span of a table's year columns, if it has any.
    pub fn spanning(table: &Table) -> Option<Self> {
        let years = year_columns(table);
        let first = years.first()?.0;
        let last = years.last()?.0;
        Some(YearRange::clamped(first, last))
    }
}

/// Identifier columns followed by the year columns inside `range`,
/// ascending. A table without year columns yields only the identifiers.
pub fn select_year_range(table: &Table, identifiers: &[&str], range: YearRange) -> Result<Table> {
    let years = year_columns(table);
    let mut names: Vec<&str> = identifiers.to_vec();
    names.extend(
        years
            .iter()
            .filter(|(y, _)| range.contains(*y))
            .map(|(_, name)| name.as_str()),
    );
    table.select(&names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};
    use crate::error::EngineError;

    fn wide() -> Table {
        let col = |name: &str| Column::new(name, vec![CellValue::Integer(1)]);
        Table::new(vec![
            col("Scenario"),
            col("2030"),
            col("Unit"),
            col("2020"),
            col("2025"),
            col("20a0"),
        ])
        .unwrap()
    }

    #[test]
    fn classifies_year_columns() {
        assert!(is_year_column("2050"));
        assert!(!is_year_column(""));
        assert!(!is_year_column("2050.0"));
        assert!(!is_year_column(" 2050"));
        let years: Vec<u32> = year_columns(&wide()).into_iter().map(|(y, _)| y).collect();
        assert_eq!(years, vec![2020, 2025, 2030]);
    }

    #[test]
    fn selects_identifiers_then_sorted_years() {
        let out = select_year_range(&wide(), &["Scenario", "Unit"], YearRange::clamped(2020, 2025)).unwrap();
        assert_eq!(out.column_names(), vec!["Scenario", "Unit", "2020", "2025"]);
    }

    #[test]
    fn single_year_range() {
        let out = select_year_range(&wide(), &["Scenario"], YearRange::clamped(2030, 2030)).unwrap();
        assert_eq!(out.column_names(), vec!["Scenario", "2030"]);
        let out = select_year_range(&wide(), &["Scenario"], YearRange::clamped(2031, 2031)).unwrap();
        assert_eq!(out.column_names(), vec!["Scenario"]);
    }

    #[test]
    fn no_year_columns_yields_identifiers() {
        let t = Table::new(vec![Column::new("Model", vec![])]).unwrap();
        let out = select_year_range(&t, &["Model"], YearRange::clamped(2020, 2050)).unwrap();
        assert_eq!(out.column_names(), vec!["Model"]);
        assert_eq!(YearRange::spanning(&t), None);
    }

    #[test]
    fn missing_identifier_is_invalid_input() {
        let err = select_year_range(&wide(), &["Metric"], YearRange::clamped(2020, 2050)).unwrap_err();
        assert!(matches!(err, EngineError::MissingColumn(ref c) if c == "Metric"));
    }

    #[test]
    fn inverted_range_is_clamped() {
        let r = YearRange::clamped(2040, 2030);
        assert_eq!((r.start, r.end), (2040, 2040));
        assert!(r.was_clamped);
        assert!(!YearRange::clamped(2020, 2030).was_clamped);
        assert_eq!(YearRange::spanning(&wide()).map(|r| (r.start, r.end)), Some((2020, 2030)));
    }
}
