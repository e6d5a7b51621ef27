use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours: result column → Color32
// ---------------------------------------------------------------------------

/// Stable colour per plotted result column.
#[derive(Debug, Clone, Default)]
pub struct SeriesPalette {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesPalette {
    /// Assign colours in column order so a column keeps its colour across files.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let mapping = names
            .iter()
            .zip(generate_palette(names.len()))
            .map(|(name, c)| (name.as_ref().to_string(), c))
            .collect();
        SeriesPalette { mapping }
    }

    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping.get(name).copied().unwrap_or(Color32::LIGHT_BLUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size_and_distinct_colours() {
        let palette = generate_palette(3);
        assert_eq!(palette.len(), 3);
        assert_ne!(palette[0], palette[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_unknown_series_gets_fallback() {
        let colours = SeriesPalette::new(&["ESR (Ω)", "Energy Efficiency (%)"]);
        assert_ne!(colours.color_for("ESR (Ω)"), colours.color_for("Energy Efficiency (%)"));
        assert_eq!(colours.color_for("nope"), Color32::LIGHT_BLUE);
    }
}
