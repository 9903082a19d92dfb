use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use pathway_explorer::config::{Page, Sector, SectorInfo};
use pathway_explorer::data::filter::{distinct_count, distinct_matching};

use crate::state::{AppState, DatasetView, ReferenceState, ReferenceTab};
use crate::ui::{plot, table};

const INTRO: &str = "Here you can find all the raw data, eligible scenarios and pathways \
    that inform the cross sector and sector-specific standards.";

const CRITERIA_NOTE: &str = "The sector-specific requirements for key economic activities are \
    derived from specific scenarios to provide additional guidelines on how activities need to \
    transition at interim periods on the way to net zero. Activity milestones are not available \
    in all IPCC scenarios and may vary widely across IPCC models.";

// ---------------------------------------------------------------------------
// Home – sector tiles
// ---------------------------------------------------------------------------

pub fn home(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("Pathway Explorer").size(36.0).strong());
    ui.label(INTRO);
    ui.add_space(12.0);

    let mut target = None;
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.columns(3, |cols: &mut [Ui]| {
            for sector in Sector::ALL {
                let info = sector.info();
                if tile(&mut cols[info.tile_column], &info) {
                    target = Some(Page::Sector(sector));
                }
            }
        });
    });

    if let Some(page) = target {
        state.navigate(page);
    }
}

/// Returns true when clicked.
fn tile(ui: &mut Ui, info: &SectorInfo) -> bool {
    let [r, g, b] = info.color;
    let fill = Color32::from_rgb(r, g, b);
    let mut clicked = false;

    egui::Frame::group(ui.style()).fill(fill).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            let title = RichText::new(info.title).heading().color(Color32::WHITE);
            clicked = ui.add(egui::Button::new(title).fill(fill)).clicked();
            ui.label(RichText::new(format!("Pathway: {}", info.pathway)).color(Color32::WHITE));
            if !info.metrics.is_empty() {
                let metrics = info.metrics.join("\n- ");
                ui.label(RichText::new(format!("Metrics:\n- {metrics}")).color(Color32::WHITE));
            }
        });
    });
    ui.add_space(12.0);
    clicked
}

// ---------------------------------------------------------------------------
// Sector page
// ---------------------------------------------------------------------------

/// Preview of the raw data, then the filtered table and chart once applied.
pub fn sector(ui: &mut Ui, view: &DatasetView) {
    ui.heading(format!("View and Filter {}", view.config.name));

    let Some(full) = &view.table else {
        ui.label(view.status_message.as_deref().unwrap_or("No dataset loaded."));
        return;
    };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.strong("Data Preview");
        table::data_grid(ui, "preview", full, 5);
        ui.add_space(8.0);

        let Some(response) = &view.response else {
            return;
        };
        ui.strong(format!("Filtered Data {}", view.config.name));
        table::data_grid(ui, "filtered", &response.table, 100);
        ui.add_space(8.0);

        if let Some(chart) = &response.chart {
            plot::pathway_plot(ui, chart, view.color_map.as_ref());
        }
    });
}

pub fn under_construction(ui: &mut Ui, sector: Sector) {
    ui.heading(sector.info().title);
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Under Construction");
    });
}

// ---------------------------------------------------------------------------
// Reference page
// ---------------------------------------------------------------------------

pub fn reference(ui: &mut Ui, reference: &mut ReferenceState) {
    ui.label(INTRO);
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut reference.tab, ReferenceTab::Document, "Document");
        ui.selectable_value(&mut reference.tab, ReferenceTab::Criteria, "Criteria");
    });
    ui.separator();

    match reference.tab {
        ReferenceTab::Document => scenario_browser(ui, reference),
        ReferenceTab::Criteria => {
            ui.label("This sheet shows the phase out dates for some fossil commodities.");
            ui.weak(CRITERIA_NOTE);
            match &reference.criteria.table {
                Some(t) => table::data_grid(ui, "criteria", t, t.n_rows()),
                None => {
                    ui.label(reference.criteria.status_message.as_deref().unwrap_or("No dataset loaded."));
                }
            }
        }
    }
}

/// Column buttons on the left, searchable distinct values on the right.
fn scenario_browser(ui: &mut Ui, reference: &mut ReferenceState) {
    ui.heading("Eligible Scenarios");
    ui.label(
        "These are the eligible scenarios that pass the principle-driven criteria used in \
         cross-sector and sector-specific pathways.",
    );

    let Some(data) = &reference.scenarios.table else {
        ui.label(reference.scenarios.status_message.as_deref().unwrap_or("No dataset loaded."));
        return;
    };

    ui.columns(2, |cols: &mut [Ui]| {
        for &col in reference.scenarios.config.filter_columns {
            let label = format!("{} {col}", distinct_count(data, col));
            if cols[0]
                .selectable_label(reference.selected_column == col, label)
                .clicked()
            {
                reference.selected_column = col.to_string();
            }
        }

        let right = &mut cols[1];
        right.horizontal(|ui: &mut Ui| {
            ui.label("Search:");
            ui.text_edit_singleline(&mut reference.search);
        });
        let values = distinct_matching(data, &reference.selected_column, &reference.search);
        ScrollArea::vertical()
            .max_height(600.0)
            .show(right, |ui: &mut Ui| {
                for value in values {
                    ui.label(value);
                }
            });
    });
}
