//! One dashboard interaction as a pure function.
//!
//! The presentation layer gathers everything an interaction needs into a
//! [`ViewRequest`] and gets back a [`ViewResponse`]; no state survives
//! between calls.

use crate::config::DatasetConfig;
use crate::data::aggregate::{aggregate_median, chart_years, MedianChart};
use crate::data::filter::{filter_table, FilterSpec};
use crate::data::model::Table;
use crate::data::years::{select_year_range, YearRange};
use crate::error::{EngineError, Result};

/// Per-request context for a dataset page.
#[derive(Debug, Clone, Copy)]
pub struct ViewRequest<'a> {
    /// `None` when no dataset could be loaded.
    pub table: Option<&'a Table>,
    pub dataset: &'a DatasetConfig,
    pub filters: &'a FilterSpec,
    /// Requested `(start, end)` years; `None` selects the full span.
    pub years: Option<(u32, u32)>,
}

/// Result of one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewResponse {
    /// Filtered (and, for year-filtered datasets, column-sliced) table.
    pub table: Table,
    /// The year range actually applied, after clamping.
    pub years: Option<YearRange>,
    pub chart: Option<MedianChart>,
}

impl ViewResponse {
    /// Whether the requested end year had to be reset to the start year.
    pub fn year_range_clamped(&self) -> bool {
        self.years.is_some_and(|r| r.was_clamped)
    }
}

/// Run filter → year range → median chart for one request.
pub fn handle(request: &ViewRequest<'_>) -> Result<ViewResponse> {
    let table = request.table.ok_or_else(|| {
        EngineError::InvalidInput(format!("no table loaded for '{}'", request.dataset.name))
    })?;

    if log::log_enabled!(log::Level::Debug) {
        let filters = serde_json::to_string(request.filters).unwrap_or_default();
        log::debug!("{}: filters {filters}, years {:?}", request.dataset.name, request.years);
    }

    let table = table.drop_columns(request.dataset.remove_columns);
    let filtered = filter_table(&table, request.filters);

    let (filtered, years) = if request.dataset.year_filter {
        let range = match request.years {
            Some((start, end)) => Some(YearRange::clamped(start, end)),
            None => YearRange::spanning(&filtered),
        };
        match range {
            Some(range) => {
                let sliced = select_year_range(&filtered, request.dataset.filter_columns, range)?;
                (sliced, Some(range))
            }
            None => (filtered, None),
        }
    } else {
        (filtered, None)
    };

    let chart = if request.dataset.median_chart {
        Some(aggregate_median(
            &filtered,
            request.dataset.filter_columns,
            &chart_years(),
        )?)
    } else {
        None
    };

    Ok(ViewResponse {
        table: filtered,
        years,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CRITERIA, POWER_SECTOR};
    use crate::data::model::{CellValue, Column};

    fn power_table() -> Table {
        let mut columns = vec![
            Column::new("Scenario", vec!["NZE".into(), "APS".into(), "Median (IPCC)".into()]),
            Column::new("Metric", vec!["Emissions".into(); 3]),
            Column::new("Unit", vec!["tCO2e".into(), "tCO2e".into(), "tCO2e".into()]),
        ];
        for year in (2020..=2050).step_by(5) {
            columns.push(Column::new(
                year.to_string(),
                vec![CellValue::Integer(10), CellValue::Integer(30), CellValue::Integer(99)],
            ));
        }
        Table::new(columns).unwrap()
    }

    #[test]
    fn absent_table_is_invalid_input() {
        let filters = FilterSpec::new();
        let req = ViewRequest {
            table: None,
            dataset: &POWER_SECTOR,
            filters: &filters,
            years: None,
        };
        assert!(matches!(handle(&req), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn inverted_years_are_clamped_not_rejected() {
        let table = power_table();
        let filters = FilterSpec::new();
        let req = ViewRequest {
            table: Some(&table),
            dataset: &POWER_SECTOR,
            filters: &filters,
            years: Some((2040, 2030)),
        };
        let resp = handle(&req).unwrap();
        assert!(resp.year_range_clamped());
        assert_eq!(resp.table.column_names(), vec!["Scenario", "Metric", "Unit", "2040"]);
        let chart = resp.chart.unwrap();
        assert_eq!(chart.result.median_rows().count(), 1);
    }

    #[test]
    fn full_span_by_default() {
        let table = power_table();
        let filters = FilterSpec::new().with("Scenario", ["nze", "aps"]);
        let req = ViewRequest {
            table: Some(&table),
            dataset: &POWER_SECTOR,
            filters: &filters,
            years: None,
        };
        let resp = handle(&req).unwrap();
        assert_eq!(resp.table.n_rows(), 2);
        assert_eq!(resp.table.n_cols(), 3 + 7);
        let chart = resp.chart.unwrap();
        assert!(chart.result.median_rows().all(|r| r.value == Some(20.0)));
        assert_eq!(chart.labels.unit, "tCO2e");
    }

    #[test]
    fn plain_datasets_only_filter() {
        let table = Table::new(vec![
            Column::new("Model", vec!["A".into(), "B".into()]),
            Column::new("2030", vec![1i64.into(), 2i64.into()]),
        ])
        .unwrap();
        let filters = FilterSpec::new().with("Model", ["b"]);
        let req = ViewRequest {
            table: Some(&table),
            dataset: &CRITERIA,
            filters: &filters,
            years: Some((2020, 2020)),
        };
        let resp = handle(&req).unwrap();
        assert_eq!(resp.table.n_rows(), 1);
        assert_eq!(resp.table.n_cols(), 2);
        assert!(resp.chart.is_none());
        assert!(resp.years.is_none());
    }
}
