//! Median-across-groups aggregation feeding the pathway line chart.
//!
//! The wide table (one column per year) is reshaped to long form, and a
//! synthetic `"Median - ALL"` series holding the per-year median of every
//! other series is appended.

use std::collections::{BTreeMap, HashSet};

use super::model::{CellValue, Column, Table};
use super::years::year_columns;
use crate::error::{EngineError, Result};

/// Series label of the synthetic median rows.
pub const MEDIAN_SERIES: &str = "Median - ALL";
/// Rows whose text contains this marker are pre-computed medians and are skipped.
pub const MEDIAN_MARKER: &str = "Median";
pub const UNIT_COLUMN: &str = "Unit";
pub const METRIC_COLUMN: &str = "Metric";
pub const MIXED_UNIT: &str = "Unit (Mixed)";
pub const MIXED_METRIC: &str = "Multiple Metric";

/// Years plotted by the chart: 2020 through 2050 in steps of five.
pub fn chart_years() -> Vec<u32> {
    (2020..=2050).step_by(5).collect()
}

/// One observation in long form.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    /// Values of the group-key columns, in the requested order.
    pub keys: Vec<CellValue>,
    pub year: u32,
    /// `None` when the source cell was missing or not numeric.
    pub value: Option<f64>,
}

impl LongRow {
    /// Legend name: the first group key.
    pub fn series_name(&self) -> String {
        self.keys.first().map(|k| k.to_string()).unwrap_or_default()
    }

    pub fn is_median(&self) -> bool {
        matches!(self.keys.first(), Some(CellValue::String(s)) if s == MEDIAN_SERIES)
    }
}

/// Long-form rows: the reshaped originals followed by one median row per year.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub group_keys: Vec<String>,
    pub rows: Vec<LongRow>,
}

impl AggregationResult {
    pub fn median_rows(&self) -> impl Iterator<Item = &LongRow> {
        self.rows.iter().filter(|r| r.is_median())
    }

    /// Points per series in first-appearance order, missing values skipped.
    pub fn series(&self) -> Vec<(String, Vec<[f64; 2]>)> {
        let mut order: Vec<String> = Vec::new();
        let mut points: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
        for row in &self.rows {
            let name = row.series_name();
            let entry = points.entry(name.clone()).or_insert_with(|| {
                order.push(name);
                Vec::new()
            });
            if let Some(v) = row.value {
                entry.push([f64::from(row.year), v]);
            }
        }
        order
            .into_iter()
            .map(|name| {
                let pts = points.remove(&name).unwrap_or_default();
                (name, pts)
            })
            .collect()
    }

    /// Render as a table with the group keys, then `Year` and `Value`.
    pub fn to_table(&self) -> Result<Table> {
        let mut columns: Vec<Column> = self
            .group_keys
            .iter()
            .map(|k| Column::new(k.clone(), Vec::with_capacity(self.rows.len())))
            .collect();
        let mut years = Vec::with_capacity(self.rows.len());
        let mut values = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            for (col, key) in columns.iter_mut().zip(&row.keys) {
                col.values.push(key.clone());
            }
            years.push(CellValue::Integer(i64::from(row.year)));
            values.push(CellValue::from(row.value));
        }

        columns.push(Column::new("Year", years));
        columns.push(Column::new("Value", values));
        Table::new(columns)
    }
}

/// Axis labels for the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLabels {
    pub unit: String,
    pub title: String,
}

impl DisplayLabels {
    pub fn mixed() -> Self {
        DisplayLabels {
            unit: MIXED_UNIT.to_string(),
            title: MIXED_METRIC.to_string(),
        }
    }

    pub fn is_mixed(&self) -> bool {
        self.unit == MIXED_UNIT && self.title == MIXED_METRIC
    }
}

/// Everything the chart renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianChart {
    pub result: AggregationResult,
    pub labels: DisplayLabels,
}

/// Median of the finite values; the mean of the two middle values for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Reshape `table` to long form over `years` and append the per-year median.
///
/// Only years on the chart stride (see [`chart_years`]) that exist as
/// columns are used. Rows containing [`MEDIAN_MARKER`] in any cell are
/// dropped first.
pub fn aggregate_median(table: &Table, group_keys: &[&str], years: &[u32]) -> Result<MedianChart> {
    if group_keys.is_empty() {
        return Err(EngineError::InvalidInput(
            "at least one group key column is required".to_string(),
        ));
    }
    let key_columns = group_keys
        .iter()
        .map(|k| {
            table
                .column(k)
                .ok_or_else(|| EngineError::MissingColumn(k.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let stride = chart_years();
    let year_cols: Vec<(u32, &Column)> = year_columns(table)
        .into_iter()
        .filter(|(y, _)| stride.contains(y) && years.contains(y))
        .filter_map(|(y, name)| table.column(&name).map(|c| (y, c)))
        .collect();

    let kept: Vec<usize> = (0..table.n_rows())
        .filter(|&row| !table.row(row).any(|v| v.to_string().contains(MEDIAN_MARKER)))
        .collect();
    if kept.len() < table.n_rows() {
        log::debug!("skipped {} pre-computed median rows", table.n_rows() - kept.len());
    }

    // Melt: all rows for the first year, then the next year, and so on.
    let mut rows = Vec::with_capacity(kept.len() * year_cols.len() + year_cols.len());
    for (year, col) in &year_cols {
        for &r in &kept {
            rows.push(LongRow {
                keys: key_columns.iter().map(|c| c.values[r].clone()).collect(),
                year: *year,
                value: col.values[r].as_f64(),
            });
        }
    }

    let labels = display_labels(table, &kept);

    let mut per_year: BTreeMap<u32, Vec<f64>> =
        year_cols.iter().map(|(y, _)| (*y, Vec::new())).collect();
    for row in &rows {
        if let (Some(v), Some(bucket)) = (row.value, per_year.get_mut(&row.year)) {
            bucket.push(v);
        }
    }

    for (year, mut values) in per_year {
        let mut keys = vec![CellValue::from(MEDIAN_SERIES)];
        keys.resize(group_keys.len(), CellValue::Null);
        rows.push(LongRow {
            keys,
            year,
            value: median(&mut values),
        });
    }

    Ok(MedianChart {
        result: AggregationResult {
            group_keys: group_keys.iter().map(|k| k.to_string()).collect(),
            rows,
        },
        labels,
    })
}

/// Single distinct unit → that unit and the first metric; otherwise mixed.
fn display_labels(table: &Table, rows: &[usize]) -> DisplayLabels {
    let Some(units) = table.column(UNIT_COLUMN) else {
        return DisplayLabels::mixed();
    };
    let distinct: HashSet<&CellValue> = rows
        .iter()
        .map(|&r| &units.values[r])
        .filter(|v| !v.is_null())
        .collect();
    if distinct.len() != 1 {
        return DisplayLabels::mixed();
    }

    let unit = distinct
        .into_iter()
        .next()
        .map(|v| v.to_string())
        .unwrap_or_default();
    let title = table
        .column(METRIC_COLUMN)
        .and_then(|m| rows.iter().map(|&r| &m.values[r]).find(|v| !v.is_null()))
        .map(|v| v.to_string())
        .unwrap_or_else(|| MIXED_METRIC.to_string());

    DisplayLabels { unit, title }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 3] = ["Scenario", "Metric", "Unit"];

    fn pathway_table(rows: &[(&str, &str, &str, [f64; 7])]) -> Table {
        let mut columns = vec![
            Column::new("Scenario", rows.iter().map(|r| r.0.into()).collect()),
            Column::new("Metric", rows.iter().map(|r| r.1.into()).collect()),
            Column::new("Unit", rows.iter().map(|r| r.2.into()).collect()),
        ];
        for (i, year) in chart_years().into_iter().enumerate() {
            columns.push(Column::new(
                year.to_string(),
                rows.iter().map(|r| CellValue::Float(r.3[i])).collect(),
            ));
        }
        Table::new(columns).unwrap()
    }

    fn median_for(chart: &MedianChart, year: u32) -> Option<f64> {
        chart
            .result
            .median_rows()
            .find(|r| r.year == year)
            .and_then(|r| r.value)
    }

    #[test]
    fn median_helper() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn median_of_three_groups() {
        let t = pathway_table(&[
            ("A", "Emissions", "tCO2e", [10.0; 7]),
            ("B", "Emissions", "tCO2e", [30.0; 7]),
            ("C", "Emissions", "tCO2e", [20.0; 7]),
        ]);
        let chart = aggregate_median(&t, &KEYS, &chart_years()).unwrap();
        assert_eq!(median_for(&chart, 2020), Some(20.0));
    }

    #[test]
    fn existing_median_rows_are_excluded() {
        let t = pathway_table(&[
            ("A", "Emissions", "tCO2e", [10.0; 7]),
            ("B", "Emissions", "tCO2e", [20.0; 7]),
            ("Median (IEA)", "Emissions", "tCO2e", [1000.0; 7]),
        ]);
        let chart = aggregate_median(&t, &KEYS, &chart_years()).unwrap();
        assert_eq!(median_for(&chart, 2050), Some(15.0));
        assert!(chart
            .result
            .rows
            .iter()
            .all(|r| r.series_name() != "Median (IEA)"));
        assert_eq!(chart.result.rows.len(), 2 * 7 + 7);
    }

    #[test]
    fn median_marker_in_any_column_excludes_the_row() {
        let t = pathway_table(&[
            ("A", "Emissions", "tCO2e", [10.0; 7]),
            ("B", "Emissions", "tCO2e", [20.0; 7]),
            ("C", "Median emissions", "tCO2e", [1000.0; 7]),
            ("D", "Emissions", "median tCO2e", [30.0; 7]),
        ]);
        let chart = aggregate_median(&t, &KEYS, &chart_years()).unwrap();
        // "C" carries the marker in Metric; lower-case "median" in D's Unit does not match.
        assert!(chart.result.rows.iter().all(|r| r.series_name() != "C"));
        assert!(chart.result.rows.iter().any(|r| r.series_name() == "D"));
        assert_eq!(median_for(&chart, 2030), Some(20.0));
    }

    #[test]
    fn mixed_units_degrade_labels() {
        let t = pathway_table(&[
            ("A", "Emissions", "tCO2e", [1.0; 7]),
            ("B", "Intensity", "tCO2/MWh", [2.0; 7]),
        ]);
        let chart = aggregate_median(&t, &KEYS, &chart_years()).unwrap();
        assert!(chart.labels.is_mixed());
        assert_eq!(chart.labels.unit, "Unit (Mixed)");
        assert_eq!(chart.labels.title, "Multiple Metric");
    }

    #[test]
    fn single_unit_labels() {
        let t = pathway_table(&[
            ("A", "Power emissions", "tCO2e", [1.0; 7]),
            ("B", "Power emissions", "tCO2e", [2.0; 7]),
        ]);
        let chart = aggregate_median(&t, &KEYS, &chart_years()).unwrap();
        assert_eq!(
            chart.labels,
            DisplayLabels {
                unit: "tCO2e".into(),
                title: "Power emissions".into()
            }
        );
    }

    #[test]
    fn off_stride_and_missing_values() {
        let t = Table::new(vec![
            Column::new("Scenario", vec!["A".into(), "B".into(), "C".into()]),
            Column::new("2020", vec![1i64.into(), "n/a".into(), CellValue::Null]),
            Column::new("2021", vec![5i64.into(), 6i64.into(), 7i64.into()]),
            Column::new("2030", vec![CellValue::Null, CellValue::Null, CellValue::Null]),
        ])
        .unwrap();
        let chart = aggregate_median(&t, &["Scenario"], &[2020, 2021, 2030]).unwrap();
        let years: HashSet<u32> = chart.result.rows.iter().map(|r| r.year).collect();
        assert_eq!(years, HashSet::from([2020, 2030]));
        assert_eq!(median_for(&chart, 2020), Some(1.0));
        assert_eq!(median_for(&chart, 2030), None);
        assert!(chart.labels.is_mixed());
    }

    #[test]
    fn missing_group_key_is_invalid_input() {
        let t = pathway_table(&[("A", "Emissions", "tCO2e", [1.0; 7])]);
        let err = aggregate_median(&t, &["Scenario", "Region"], &chart_years()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn series_and_long_table() {
        let t = pathway_table(&[
            ("A", "Emissions", "tCO2e", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            ("B", "Emissions", "tCO2e", [3.0; 7]),
        ]);
        let chart = aggregate_median(&t, &KEYS, &chart_years()).unwrap();
        let series = chart.result.series();
        let names: Vec<&str> = series.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["A", "B", MEDIAN_SERIES]);
        assert_eq!(series[2].1[0], [2020.0, 2.0]);

        let long = chart.result.to_table().unwrap();
        assert_eq!(long.column_names(), vec!["Scenario", "Metric", "Unit", "Year", "Value"]);
        assert_eq!(long.n_rows(), 21);
        let last = long.n_rows() - 1;
        assert_eq!(long.cell(last, 0), &CellValue::from(MEDIAN_SERIES));
        assert_eq!(long.cell(last, 2), &CellValue::Null);
    }
}
