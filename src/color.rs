use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use pathway_explorer::data::aggregate::MEDIAN_SERIES;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Stroke width of an ordinary series.
pub const SERIES_WIDTH: f32 = 1.5;
/// Stroke width of the median series.
pub const MEDIAN_WIDTH: f32 = 4.0;

// ---------------------------------------------------------------------------
// Color mapping: series name → Color32
// ---------------------------------------------------------------------------

/// Maps chart series to distinct colours. The median series is drawn
/// black (white on dark backgrounds) and takes no palette slot.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(series: &[String]) -> Self {
        let names: Vec<&String> = series.iter().filter(|s| *s != MEDIAN_SERIES).collect();
        let palette = generate_palette(names.len());
        let mapping = names
            .into_iter()
            .zip(palette)
            .map(|(name, c)| (name.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Colour and stroke width for a series.
    pub fn stroke_for(&self, series: &str, dark_mode: bool) -> (Color32, f32) {
        if series == MEDIAN_SERIES {
            let color = if dark_mode { Color32::WHITE } else { Color32::BLACK };
            return (color, MEDIAN_WIDTH);
        }
        let color = self
            .mapping
            .get(series)
            .copied()
            .unwrap_or(self.default_color);
        (color, SERIES_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_sizes() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }

    #[test]
    fn median_is_bold_and_neutral() {
        let map = ColorMap::new(&["NZE".to_string(), MEDIAN_SERIES.to_string()]);
        assert_eq!(map.stroke_for(MEDIAN_SERIES, false), (Color32::BLACK, MEDIAN_WIDTH));
        assert_eq!(map.stroke_for(MEDIAN_SERIES, true).0, Color32::WHITE);
        let (_, width) = map.stroke_for("NZE", false);
        assert_eq!(width, SERIES_WIDTH);
        assert_eq!(map.stroke_for("unknown", false).0, Color32::GRAY);
    }
}
