use std::collections::HashMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.55, 0.6))
        .collect()
}

/// Sequential scale for `t` in `[0, 1]`: pale yellow (low) to deep violet (high).
pub fn sequential(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    hsl_to_color32(55.0 + t * 215.0, 0.75, 0.65 - t * 0.3)
}

// ---------------------------------------------------------------------------
// Category colours
// ---------------------------------------------------------------------------

/// Stable category → colour assignment for the proportion chart.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: HashMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Assign palette colours to `categories` in the given order.
    pub fn new(categories: &[String]) -> Self {
        let mapping = categories
            .iter()
            .cloned()
            .zip(generate_palette(categories.len()))
            .collect();
        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category.
    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_category_is_gray() {
        let colors = CategoryColors::new(&["A".to_string(), "B".to_string()]);
        assert_ne!(colors.color_for("A"), colors.color_for("B"));
        assert_eq!(colors.color_for("Z"), Color32::GRAY);
    }

    #[test]
    fn sequential_ends_differ() {
        assert_ne!(sequential(0.0), sequential(1.0));
        assert_eq!(sequential(-3.0), sequential(0.0));
    }
}
