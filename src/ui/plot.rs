use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use pathway_explorer::data::aggregate::MedianChart;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Pathway line chart
// ---------------------------------------------------------------------------

/// One line per series plus the bold median line.
pub fn pathway_plot(ui: &mut Ui, chart: &MedianChart, color_map: Option<&ColorMap>) {
    ui.heading(&chart.labels.title);

    let dark_mode = ui.visuals().dark_mode;
    let fallback = ColorMap::new(&[]);
    let color_map = color_map.unwrap_or(&fallback);

    Plot::new("pathway_plot")
        .legend(Legend::default())
        .height(600.0)
        .x_axis_label("Year")
        .y_axis_label(chart.labels.unit.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (name, points) in chart.result.series() {
                if points.is_empty() {
                    continue;
                }
                let (color, width) = color_map.stroke_for(&name, dark_mode);
                let line = Line::new(PlotPoints::from(points))
                    .name(&name)
                    .color(color)
                    .width(width);
                plot_ui.line(line);
            }
        });
}
