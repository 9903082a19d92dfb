use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use pathway_explorer::config::{Page, Sector};
use pathway_explorer::data::export::{export_file_name, ExportFormat};

use crate::state::{AppState, DatasetView};

// ---------------------------------------------------------------------------
// Top bar – navigation
// ---------------------------------------------------------------------------

/// Render the navigation bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Pathway Explorer");
        ui.separator();

        let mut target = None;
        for page in [Page::Home, Page::Reference] {
            if ui.selectable_label(state.page == page, page.title()).clicked() {
                target = Some(page);
            }
        }

        let current = match state.page {
            Page::Sector(s) => s.info().title,
            _ => "Sectors",
        };
        egui::ComboBox::from_id_salt("sector_nav")
            .selected_text(current)
            .show_ui(ui, |ui: &mut Ui| {
                for sector in Sector::ALL {
                    let page = Page::Sector(sector);
                    if ui
                        .selectable_label(state.page == page, sector.info().title)
                        .clicked()
                    {
                        target = Some(page);
                    }
                }
            });

        if let Some(page) = target {
            state.navigate(page);
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter panel of a dataset page.
pub fn filter_panel(ui: &mut Ui, view: &mut DatasetView) {
    ui.heading("Filter Data");
    ui.separator();

    if view.table.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Per-column multiselects (collapsible) ----
            for &col in view.config.filter_columns {
                let options = view.filter_options(col);
                if options.is_empty() {
                    continue;
                }
                let n_selected = options
                    .iter()
                    .filter(|v| view.filters.is_selected(col, v))
                    .count();
                let header_text = format!("{col}  ({n_selected}/{})", options.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            view.filters.clear(col);
                        }
                        for value in &options {
                            let mut checked = view.filters.is_selected(col, value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                view.filters.toggle(col, value);
                            }
                        }
                    });
            }

            // ---- Year range ----
            if view.config.year_filter {
                ui.separator();
                let years = view.available_years();
                year_combo(ui, "Select Start Year:", "start_year", &years, &mut view.start_year);
                year_combo(ui, "Select End Year:", "end_year", &years, &mut view.end_year);
                if view.years_inverted() {
                    ui.label(
                        RichText::new("End Year must be greater than or equal to Start Year.")
                            .color(Color32::RED),
                    );
                }
            }

            ui.separator();
            if ui.button("Apply Filters").clicked() {
                view.apply();
            }

            if view.response.is_some() {
                ui.separator();
                ui.horizontal(|ui: &mut Ui| {
                    if ui.button("Download Excel").clicked() {
                        save_export_dialog(view, ExportTarget::FilteredTable, ExportFormat::Xlsx);
                    }
                    if ui.button("Download CSV").clicked() {
                        save_export_dialog(view, ExportTarget::FilteredTable, ExportFormat::Csv);
                    }
                });
                let has_chart = view.response.as_ref().is_some_and(|r| r.chart.is_some());
                if has_chart && ui.button("Download chart data").clicked() {
                    save_export_dialog(view, ExportTarget::ChartData, ExportFormat::Xlsx);
                }
            }

            if let Some(msg) = &view.status_message {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
        });
}

fn year_combo(ui: &mut Ui, label: &str, id: &str, years: &[u32], selected: &mut Option<u32>) {
    ui.label(label);
    let text = selected.map(|y| y.to_string()).unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(text)
        .show_ui(ui, |ui: &mut Ui| {
            for &year in years {
                ui.selectable_value(selected, Some(year), year.to_string());
            }
        });
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

/// What a download button saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    FilteredTable,
    ChartData,
}

pub fn save_export_dialog(view: &mut DatasetView, target: ExportTarget, format: ExportFormat) {
    let (result, dataset) = match target {
        ExportTarget::FilteredTable => (view.export_bytes(format), view.config.name.to_string()),
        ExportTarget::ChartData => (
            view.export_chart_bytes(format),
            format!("{}_chart", view.config.name),
        ),
    };
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            view.status_message = Some(format!("Error: {e:#}"));
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(export_file_name(&dataset, format))
        .add_filter(format.mime_type(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, &bytes) {
            Ok(()) => {
                log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
                view.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                view.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
