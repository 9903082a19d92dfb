use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::model::Table;

// ---------------------------------------------------------------------------
// Filter predicate: which values are accepted per column
// ---------------------------------------------------------------------------

/// Per-column selection: maps column_name → set of accepted values.
/// Values are stored lower-cased; matching is case-insensitive.
/// A column with an empty set is not filtered (show all).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    accepted: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSpec::set`].
    pub fn with<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set(column, values);
        self
    }

    /// Replace the accepted set for a column.
    pub fn set<I, S>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = values
            .into_iter()
            .map(|v| v.as_ref().to_lowercase())
            .collect();
        self.accepted.insert(column.to_string(), set);
    }

    /// Toggle one value in a column's accepted set.
    pub fn toggle(&mut self, column: &str, value: &str) {
        let key = value.to_lowercase();
        let selected = self.accepted.entry(column.to_string()).or_default();
        if !selected.remove(&key) {
            selected.insert(key);
        }
    }

    pub fn is_selected(&self, column: &str, value: &str) -> bool {
        self.accepted
            .get(column)
            .is_some_and(|s| s.contains(&value.to_lowercase()))
    }

    /// Clear the selection for a column (back to "show all").
    pub fn clear(&mut self, column: &str) {
        self.accepted.remove(column);
    }

    /// Columns that actually constrain rows.
    pub fn active(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.accepted
            .iter()
            .filter(|(_, vals)| !vals.is_empty())
            .map(|(col, vals)| (col.as_str(), vals))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * The column has no accepted values → passes (no constraint)
/// * The column is not in the table → passes (ignored)
/// * The row's lower-cased cell text is in the accepted set → passes
pub fn filtered_indices(table: &Table, filters: &FilterSpec) -> Vec<usize> {
    let checks: Vec<_> = filters
        .active()
        .filter_map(|(col, accepted)| table.column(col).map(|c| (c, accepted)))
        .collect();

    (0..table.n_rows())
        .filter(|&row| {
            checks
                .iter()
                .all(|(col, accepted)| accepted.contains(&col.values[row].match_key()))
        })
        .collect()
}

/// Narrow a table to the rows matching `filters`. Columns are untouched.
pub fn filter_table(table: &Table, filters: &FilterSpec) -> Table {
    let indices = filtered_indices(table, filters);
    log::debug!(
        "filter kept {} of {} rows",
        indices.len(),
        table.n_rows()
    );
    table.take_rows(&indices)
}

// ---------------------------------------------------------------------------
// Distinct-value browsing
// ---------------------------------------------------------------------------

/// Number of distinct non-null values in a column (0 for unknown columns).
/// Values are compared by text, so `1` and `1.0` count once.
pub fn distinct_count(table: &Table, column: &str) -> usize {
    table.column(column).map_or(0, |c| {
        c.values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect::<HashSet<_>>()
            .len()
    })
}

/// Distinct non-null values of a column whose text contains `query`
/// (case-insensitive), in first-appearance order.
pub fn distinct_matching(table: &Table, column: &str, query: &str) -> Vec<String> {
    let Some(col) = table.column(column) else {
        return Vec::new();
    };
    let needle = query.to_lowercase();
    let mut seen = HashSet::new();
    col.values
        .iter()
        .filter(|v| !v.is_null() && seen.insert(*v))
        .map(|v| v.to_string())
        .filter(|s| s.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn pathways() -> Table {
        Table::new(vec![
            Column::new(
                "Scenario",
                vec!["NZE".into(), "APS".into(), "nze".into(), "STEPS".into()],
            ),
            Column::new(
                "Unit",
                vec!["tCO2e".into(), "tCO2e".into(), "tCO2/MWh".into(), CellValue::Null],
            ),
            Column::new("2020", vec![1i64.into(), 2i64.into(), 3i64.into(), 4i64.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn empty_spec_keeps_everything() {
        let t = pathways();
        assert_eq!(filter_table(&t, &FilterSpec::new()), t);
        let spec = FilterSpec::new().with("Scenario", Vec::<String>::new());
        assert!(spec.is_empty());
        assert_eq!(filter_table(&t, &spec).n_rows(), 4);
    }

    #[test]
    fn matches_case_insensitively() {
        let t = pathways();
        let spec = FilterSpec::new().with("Scenario", ["Nze"]);
        let out = filter_table(&t, &spec);
        assert_eq!(out.n_rows(), 2);
        assert_eq!(out.column_names(), t.column_names());
    }

    #[test]
    fn columns_compose_with_and() {
        let t = pathways();
        let spec = FilterSpec::new()
            .with("Scenario", ["nze", "aps"])
            .with("Unit", ["TCO2E"]);
        assert_eq!(filtered_indices(&t, &spec), vec![0, 1]);
    }

    #[test]
    fn sequential_filters_equal_combined_spec() {
        let t = pathways();
        let f1 = FilterSpec::new().with("Scenario", ["nze", "steps"]);
        let f2 = FilterSpec::new().with("Unit", ["tco2e", "tco2/mwh"]);
        let both = f1.clone().with("Unit", ["tco2e", "tco2/mwh"]);
        let stepwise = filter_table(&filter_table(&t, &f1), &f2);
        assert_eq!(stepwise, filter_table(&t, &both));
        assert_eq!(stepwise.n_rows(), 2);
        // idempotent
        assert_eq!(filter_table(&stepwise, &both), stepwise);
    }

    #[test]
    fn unknown_column_is_ignored() {
        let t = pathways();
        let spec = FilterSpec::new().with("Region", ["World"]);
        assert_eq!(filter_table(&t, &spec).n_rows(), 4);
    }

    #[test]
    fn numeric_cells_match_their_text() {
        let t = pathways();
        let spec = FilterSpec::new().with("2020", ["3"]);
        assert_eq!(filtered_indices(&t, &spec), vec![2]);
    }

    #[test]
    fn toggle_and_clear() {
        let mut spec = FilterSpec::new();
        spec.toggle("Unit", "tCO2e");
        assert!(spec.is_selected("Unit", "TCO2E"));
        spec.toggle("Unit", "tco2e");
        assert!(!spec.is_selected("Unit", "tCO2e"));
        assert!(spec.is_empty());
        spec.toggle("Unit", "tCO2e");
        spec.clear("Unit");
        assert!(spec.is_empty());
    }

    #[test]
    fn distinct_browsing() {
        let t = pathways();
        assert_eq!(distinct_count(&t, "Unit"), 2);
        assert_eq!(distinct_count(&t, "Model"), 0);
        assert_eq!(distinct_matching(&t, "Scenario", "N"), vec!["NZE", "nze"]);
        assert_eq!(distinct_matching(&t, "Unit", ""), vec!["tCO2e", "tCO2/MWh"]);
    }

    #[test]
    fn distinct_count_compares_text() {
        let t = Table::new(vec![Column::new(
            "Year",
            vec![CellValue::Integer(1), CellValue::Float(1.0), CellValue::Integer(2), CellValue::Null],
        )])
        .unwrap();
        assert_eq!(distinct_count(&t, "Year"), 2);
    }
}
