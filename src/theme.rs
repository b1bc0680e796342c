use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub stroke_color: String,
    /// Fill of a robot's state-space box.
    pub space_fill: String,
    /// Fill of the band connecting a box to its bundle in the row below.
    pub projection_fill: String,
    /// Outline width in points.
    pub stroke_width: f32,
    /// Dash pattern in multiples of the stroke width.
    pub dash_pattern: Vec<f32>,
}

impl Theme {
    /// Black outlines on light gray, serif labels: the look of the paper figures.
    pub fn paper() -> Self {
        Self {
            font_family: "Palatino, \"Palatino Linotype\", \"TeX Gyre Pagella\", serif".to_string(),
            text_color: "#000000".to_string(),
            stroke_color: "#000000".to_string(),
            space_fill: "#E6E6E6".to_string(),
            projection_fill: "#F2F2F2".to_string(),
            stroke_width: 2.0,
            dash_pattern: vec![3.7, 1.6],
        }
    }

    /// SVG `stroke-dasharray` for a stroke drawn `stroke_px` wide.
    pub fn dasharray(&self, stroke_px: f32) -> String {
        self.dash_pattern
            .iter()
            .map(|seg| format!("{:.2}", seg * stroke_px))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::paper()
    }
}
