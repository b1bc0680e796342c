use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Label font size in points.
    pub font_size: f32,
    /// Vertical distance between the baselines of two levels.
    pub row_step: f32,
    /// Horizontal extent of one dimension unit.
    pub column_step: f32,
    /// Box height as a fraction of `row_step`.
    pub row_height_ratio: f32,
    pub label_x_ratio: f32,
    pub group_label_x_ratio: f32,
    pub label_offset_ratio: f32,
    pub label_y_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: 25.0,
            row_step: 20.0,
            column_step: 8.0,
            row_height_ratio: 0.5,
            label_x_ratio: 0.4,
            group_label_x_ratio: 0.2,
            label_offset_ratio: 0.05,
            label_y_ratio: 0.3,
        }
    }
}

impl LayoutConfig {
    pub fn row_height(&self) -> f32 {
        self.row_height_ratio * self.row_step
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Output pixels per diagram unit.
    pub pixels_per_unit: f32,
    /// Resolution used to convert point font sizes into pixels.
    pub dpi: f32,
    /// Margin around the tight bounding box, in diagram units.
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: 6.0,
            dpi: 100.0,
            padding: 1.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

impl RenderConfig {
    /// Converts a point size into pixels at `dpi`.
    pub fn points_to_pixels(&self, points: f32) -> f32 {
        points * self.dpi / 72.0
    }

    /// Converts a point size into diagram units.
    pub fn points_to_units(&self, points: f32) -> f32 {
        self.points_to_pixels(points) / self.pixels_per_unit.max(f32::EPSILON)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    text_color: Option<String>,
    stroke_color: Option<String>,
    space_fill: Option<String>,
    projection_fill: Option<String>,
    stroke_width: Option<f32>,
    dash_pattern: Option<Vec<f32>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    font_size: Option<f32>,
    row_step: Option<f32>,
    column_step: Option<f32>,
    row_height_ratio: Option<f32>,
    label_x_ratio: Option<f32>,
    group_label_x_ratio: Option<f32>,
    label_offset_ratio: Option<f32>,
    label_y_ratio: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderFile {
    pixels_per_unit: Option<f32>,
    dpi: Option<f32>,
    padding: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    theme: Option<ThemeFile>,
    layout: Option<LayoutFile>,
    render: Option<RenderFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parses a JSON config, accepting JSON5 for hand-written files.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config: {json_err}"))?,
    };

    let mut config = Config::default();
    if let Some(theme) = parsed.theme {
        if let Some(v) = theme.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = theme.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = theme.stroke_color {
            config.theme.stroke_color = v;
        }
        if let Some(v) = theme.space_fill {
            config.theme.space_fill = v;
        }
        if let Some(v) = theme.projection_fill {
            config.theme.projection_fill = v;
        }
        if let Some(v) = theme.stroke_width {
            config.theme.stroke_width = v;
        }
        if let Some(v) = theme.dash_pattern {
            config.theme.dash_pattern = v;
        }
    }
    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.font_size {
            target.font_size = v;
        }
        if let Some(v) = layout.row_step {
            target.row_step = v;
        }
        if let Some(v) = layout.column_step {
            target.column_step = v;
        }
        if let Some(v) = layout.row_height_ratio {
            target.row_height_ratio = v;
        }
        if let Some(v) = layout.label_x_ratio {
            target.label_x_ratio = v;
        }
        if let Some(v) = layout.group_label_x_ratio {
            target.group_label_x_ratio = v;
        }
        if let Some(v) = layout.label_offset_ratio {
            target.label_offset_ratio = v;
        }
        if let Some(v) = layout.label_y_ratio {
            target.label_y_ratio = v;
        }
    }
    if let Some(render) = parsed.render {
        if let Some(v) = render.pixels_per_unit {
            config.render.pixels_per_unit = v;
        }
        if let Some(v) = render.dpi {
            config.render.dpi = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }
    Ok(config)
}
