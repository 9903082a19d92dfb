use eframe::egui::{self, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};
use pathway_explorer::data::model::Table;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Data grid
// ---------------------------------------------------------------------------

/// Render up to `max_rows` rows of a table as a striped grid.
pub fn data_grid(ui: &mut Ui, id: &str, table: &Table, max_rows: usize) {
    if table.n_cols() == 0 {
        ui.label("Empty table.");
        return;
    }
    let n_rows = table.n_rows().min(max_rows);

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(ROW_HEIGHT * 25.0)
                .columns(GridColumn::auto().at_least(60.0), table.n_cols())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for name in table.column_names() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, n_rows, |mut row| {
                        let r = row.index();
                        for c in 0..table.n_cols() {
                            row.col(|ui: &mut Ui| {
                                ui.label(table.cell(r, c).to_string());
                            });
                        }
                    });
                });
        });
    });

    if table.n_rows() > n_rows {
        ui.weak(format!("showing {n_rows} of {} rows", table.n_rows()));
    }
}
