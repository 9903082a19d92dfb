use std::collections::BTreeMap;

use anyhow::Result;
use pathway_explorer::config::{AppConfig, DatasetConfig, Page, Sector, CRITERIA, ELIGIBLE_SCENARIOS};
use pathway_explorer::data::export::ExportFormat;
use pathway_explorer::data::filter::FilterSpec;
use pathway_explorer::data::loader::load_file;
use pathway_explorer::data::model::Table;
use pathway_explorer::data::years::year_columns;
use pathway_explorer::request::{handle, ViewRequest, ViewResponse};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Per-dataset view state
// ---------------------------------------------------------------------------

/// Everything one dataset page remembers between frames.
pub struct DatasetView {
    pub config: DatasetConfig,

    /// Loaded table (None until loaded, or when loading failed).
    pub table: Option<Table>,

    /// Multiselect state per filter column.
    pub filters: FilterSpec,

    /// Year bounds chosen in the combo boxes.
    pub start_year: Option<u32>,
    pub end_year: Option<u32>,

    /// Output of the last "Apply Filters".
    pub response: Option<ViewResponse>,

    /// Series colours for the last chart.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl DatasetView {
    pub fn new(config: DatasetConfig) -> Self {
        Self {
            config,
            table: None,
            filters: FilterSpec::default(),
            start_year: None,
            end_year: None,
            response: None,
            color_map: None,
            status_message: None,
        }
    }

    /// Load the dataset file and reset selections.
    pub fn load(&mut self, app_config: &AppConfig) {
        let path = app_config.dataset_path(&self.config);
        match load_file(&path) {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.table = None;
                self.status_message = Some(format!("File not found or unreadable: {e:#}"));
            }
        }
    }

    pub fn set_table(&mut self, table: Table) {
        let table = table.drop_columns(self.config.remove_columns);
        let years = year_columns(&table);
        self.start_year = years.first().map(|(y, _)| *y);
        self.end_year = years.last().map(|(y, _)| *y);
        self.filters = FilterSpec::default();
        self.response = None;
        self.color_map = None;
        self.status_message = None;
        self.table = Some(table);
    }

    /// Multiselect options for a filter column, taken from the full table.
    pub fn filter_options(&self, column: &str) -> Vec<String> {
        self.table
            .as_ref()
            .map(|t| t.distinct_text(column))
            .unwrap_or_default()
    }

    pub fn available_years(&self) -> Vec<u32> {
        self.table
            .as_ref()
            .map(|t| year_columns(t).into_iter().map(|(y, _)| y).collect())
            .unwrap_or_default()
    }

    /// The combo boxes currently hold an end year before the start year.
    pub fn years_inverted(&self) -> bool {
        matches!((self.start_year, self.end_year), (Some(s), Some(e)) if e < s)
    }

    /// Run the current selections through the engine.
    pub fn apply(&mut self) {
        let years = match (self.start_year, self.end_year) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        };
        let request = ViewRequest {
            table: self.table.as_ref(),
            dataset: &self.config,
            filters: &self.filters,
            years,
        };
        match handle(&request) {
            Ok(response) => {
                if response.year_range_clamped() {
                    self.end_year = self.start_year;
                }
                self.color_map = response.chart.as_ref().map(|c| {
                    let names: Vec<String> = c.result.series().into_iter().map(|(n, _)| n).collect();
                    ColorMap::new(&names)
                });
                self.status_message = None;
                self.response = Some(response);
            }
            Err(e) => {
                log::error!("{}: {e}", self.config.name);
                self.status_message = Some(e.to_string());
                self.response = None;
            }
        }
    }

    /// Serialize the last filtered table.
    pub fn export_bytes(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let response = self
            .response
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Apply the filters before exporting"))?;
        Ok(format.write(&response.table)?)
    }

    /// Serialize the long-form chart data, median series included.
    pub fn export_chart_bytes(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let chart = self
            .response
            .as_ref()
            .and_then(|r| r.chart.as_ref())
            .ok_or_else(|| anyhow::anyhow!("No chart to export"))?;
        Ok(format.write(&chart.result.to_table()?)?)
    }
}

// ---------------------------------------------------------------------------
// Reference page state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceTab {
    #[default]
    Document,
    Criteria,
}

pub struct ReferenceState {
    pub tab: ReferenceTab,
    pub scenarios: DatasetView,
    pub criteria: DatasetView,
    /// Column whose distinct values are listed on the Document tab.
    pub selected_column: String,
    pub search: String,
}

impl Default for ReferenceState {
    fn default() -> Self {
        Self {
            tab: ReferenceTab::default(),
            scenarios: DatasetView::new(ELIGIBLE_SCENARIOS),
            criteria: DatasetView::new(CRITERIA),
            selected_column: ELIGIBLE_SCENARIOS.filter_columns[0].to_string(),
            search: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,
    pub page: Page,
    pub sectors: BTreeMap<Sector, DatasetView>,
    pub reference: Option<ReferenceState>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            page: Page::Home,
            sectors: BTreeMap::new(),
            reference: None,
        }
    }

    /// Switch page, loading its datasets on first visit.
    pub fn navigate(&mut self, page: Page) {
        log::info!("navigate to {}", page.title());
        self.page = page;
        match page {
            Page::Home => {}
            Page::Reference => {
                if self.reference.is_none() {
                    let mut reference = ReferenceState::default();
                    reference.scenarios.load(&self.config);
                    reference.criteria.load(&self.config);
                    self.reference = Some(reference);
                }
            }
            Page::Sector(sector) => {
                if let Some(dataset) = sector.info().dataset {
                    if !self.sectors.contains_key(&sector) {
                        let mut view = DatasetView::new(dataset);
                        view.load(&self.config);
                        self.sectors.insert(sector, view);
                    }
                }
            }
        }
    }
}
