use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Key;

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

pub const MALE_BLUE: Color32 = Color32::from_rgb(0, 0, 255);
pub const FEMALE_PINK: Color32 = Color32::from_rgb(255, 192, 203);

/// Steel blue, the default bar colour.
pub const BAR_FILL: Color32 = Color32::from_rgb(70, 130, 180);

/// Bars outside an active selection.
pub const DESELECTED: Color32 = Color32::from_gray(170);

// ---------------------------------------------------------------------------
// Color mapping: key → Color32
// ---------------------------------------------------------------------------

/// Ordinal scale from keys to colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Key, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Explicit domain/range pairs; keys past the end of `range` get the
    /// default colour.
    pub fn ordinal<'a>(domain: impl IntoIterator<Item = &'a str>, range: &[Color32]) -> Self {
        let mapping = domain
            .into_iter()
            .zip(range.iter().copied())
            .map(|(k, c)| (Key::text(k), c))
            .collect();
        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// One generated colour per label.
    pub fn generated<'a>(labels: impl ExactSizeIterator<Item = &'a str>) -> Self {
        let palette = generate_palette(labels.len());
        Self::ordinal(labels, &palette)
    }

    /// Blue for `Male`, pink for `Female`.
    pub fn gender() -> Self {
        Self::ordinal(["Male", "Female"], &[MALE_BLUE, FEMALE_PINK])
    }

    /// Look up the colour for a key.
    pub fn color_for(&self, key: &Key) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(self.default_color)
    }

    /// Look up the colour for a text key without building a [`Key`].
    pub fn color_for_text(&self, label: &str) -> Color32 {
        self.mapping
            .iter()
            .find(|(k, _)| k.as_str() == Some(label))
            .map(|(_, c)| *c)
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_scale_matches_domain() {
        let colors = ColorMap::gender();
        assert_eq!(colors.color_for(&Key::text("Male")), MALE_BLUE);
        assert_eq!(colors.color_for_text("Female"), FEMALE_PINK);
        assert_eq!(colors.color_for_text("Other"), Color32::GRAY);
    }

    #[test]
    fn generated_colours_are_distinct() {
        let colors = ColorMap::generated(["Prof", "Asst Prof", "Assoc Prof"].into_iter());
        let a = colors.color_for_text("Prof");
        let b = colors.color_for_text("Asst Prof");
        let c = colors.color_for_text("Assoc Prof");
        assert!(a != b && b != c && a != c);
        assert_eq!(generate_palette(0), Vec::new());
    }
}
