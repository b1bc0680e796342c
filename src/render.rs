use crate::config::{LayoutConfig, RenderConfig};
use crate::label::{MathLabel, RunStyle, SCRIPT_SCALE};
use crate::layout::{Fill, Layout, Line, Patch, Stroke, TextItem};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

// Glyph extents relative to the font size, for the tight bounding box.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.25;

/// Region of the diagram (y-up units) that ends up on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    fn include(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.min_x = self.min_x.min(x0);
        self.min_y = self.min_y.min(y0);
        self.max_x = self.max_x.max(x1);
        self.max_y = self.max_y.max(y1);
    }

    fn pad(&mut self, padding: f32) {
        self.min_x -= padding;
        self.min_y -= padding;
        self.max_x += padding;
        self.max_y += padding;
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Axes box `[0, width] x [0, height]` grown to fit every label, like a
/// tight bounding box around all drawn artists.
pub fn tight_bounds(
    layout: &Layout,
    theme: &Theme,
    layout_cfg: &LayoutConfig,
    render_cfg: &RenderConfig,
) -> Bounds {
    let mut bounds = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: layout.width,
        max_y: layout.height,
    };
    let size_px = render_cfg.points_to_pixels(layout_cfg.font_size);
    let size_units = render_cfg.points_to_units(layout_cfg.font_size);
    let ppu = render_cfg.pixels_per_unit.max(f32::EPSILON);
    for text in &layout.scene.texts {
        let width = text.label.measure_width(&theme.font_family, size_px) / ppu;
        bounds.include(
            text.x,
            text.y - DESCENT * size_units,
            text.x + width,
            text.y + ASCENT * size_units,
        );
    }
    bounds.pad(render_cfg.padding);
    bounds
}

struct Canvas {
    bounds: Bounds,
    ppu: f32,
}

impl Canvas {
    fn x(&self, x: f32) -> f32 {
        (x - self.bounds.min_x) * self.ppu
    }

    fn y(&self, y: f32) -> f32 {
        (self.bounds.max_y - y) * self.ppu
    }

    fn len(&self, len: f32) -> f32 {
        len * self.ppu
    }
}

pub fn render_svg(
    layout: &Layout,
    theme: &Theme,
    layout_cfg: &LayoutConfig,
    render_cfg: &RenderConfig,
) -> String {
    let bounds = tight_bounds(layout, theme, layout_cfg, render_cfg);
    let canvas = Canvas {
        bounds,
        ppu: render_cfg.pixels_per_unit.max(f32::EPSILON),
    };
    let width = canvas.len(bounds.width()).ceil().max(1.0);
    let height = canvas.len(bounds.height()).ceil().max(1.0);
    let stroke_px = render_cfg.points_to_pixels(theme.stroke_width);
    let font_px = render_cfg.points_to_pixels(layout_cfg.font_size);

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render_cfg.background
    );

    svg.push_str("<g class=\"patches\">");
    for patch in &layout.scene.patches {
        svg.push_str(&patch_svg(patch, &canvas, theme, stroke_px));
    }
    svg.push_str("</g><g class=\"lines\">");
    for line in &layout.scene.lines {
        svg.push_str(&line_svg(line, &canvas, theme, stroke_px));
    }
    svg.push_str("</g><g class=\"labels\">");
    for text in &layout.scene.texts {
        svg.push_str(&text_svg(text, &canvas, theme, font_px));
    }
    svg.push_str("</g></svg>");
    svg
}

fn fill_color(fill: Fill, theme: &Theme) -> &str {
    match fill {
        Fill::Space => &theme.space_fill,
        Fill::Projection => &theme.projection_fill,
    }
}

fn stroke_attrs(stroke: Option<Stroke>, theme: &Theme, stroke_px: f32) -> String {
    match stroke {
        None => "stroke=\"none\"".to_string(),
        Some(Stroke::Solid) => format!(
            "stroke=\"{}\" stroke-width=\"{stroke_px:.2}\"",
            theme.stroke_color
        ),
        Some(Stroke::Dashed) => format!(
            "stroke=\"{}\" stroke-width=\"{stroke_px:.2}\" stroke-dasharray=\"{}\"",
            theme.stroke_color,
            theme.dasharray(stroke_px)
        ),
    }
}

fn patch_svg(patch: &Patch, canvas: &Canvas, theme: &Theme, stroke_px: f32) -> String {
    match patch {
        Patch::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let fill = (*fill).map(|f| fill_color(f, theme)).unwrap_or("none");
            format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" {}/>",
                canvas.x(*x),
                canvas.y(y + height),
                canvas.len(*width),
                canvas.len(*height),
                fill,
                stroke_attrs(*stroke, theme, stroke_px)
            )
        }
        Patch::Polygon { points, fill } => {
            let points: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{:.2},{:.2}", canvas.x(*x), canvas.y(*y)))
                .collect();
            format!(
                "<polygon points=\"{}\" fill=\"{}\" stroke=\"none\"/>",
                points.join(" "),
                fill_color(*fill, theme)
            )
        }
    }
}

fn line_svg(line: &Line, canvas: &Canvas, theme: &Theme, stroke_px: f32) -> String {
    format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {}/>",
        canvas.x(line.from.0),
        canvas.y(line.from.1),
        canvas.x(line.to.0),
        canvas.y(line.to.1),
        stroke_attrs(Some(line.stroke), theme, stroke_px)
    )
}

fn text_svg(text: &TextItem, canvas: &Canvas, theme: &Theme, font_px: f32) -> String {
    format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{font_px:.2}\" fill=\"{}\">{}</text>",
        canvas.x(text.x),
        canvas.y(text.y),
        escape_xml(&theme.font_family),
        theme.text_color,
        label_tspans(&text.label, font_px)
    )
}

fn label_tspans(label: &MathLabel, font_px: f32) -> String {
    let mut out = String::new();
    for run in label.runs() {
        let text = escape_xml(&run.text);
        match run.style {
            RunStyle::Upright => {
                let _ = write!(out, "<tspan>{text}</tspan>");
            }
            RunStyle::Italic => {
                let _ = write!(out, "<tspan font-style=\"italic\">{text}</tspan>");
            }
            RunStyle::Superscript => {
                let _ = write!(
                    out,
                    "<tspan baseline-shift=\"super\" font-size=\"{:.2}\">{text}</tspan>",
                    font_px * SCRIPT_SCALE
                );
            }
        }
    }
    out
}

pub fn write_output_svg(svg: &str, output: &Path) -> Result<()> {
    std::fs::write(output, svg)?;
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "serif".to_string();
    if let Some(family) = theme
        .font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"'))
        .find(|part| !part.is_empty())
    {
        opt.font_family = family.to_string();
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ir::{Hierarchy, Level, Robot};
    use crate::layout::compute_layout;
    use crate::space::SpaceType;

    fn drones() -> Hierarchy {
        Hierarchy {
            levels: vec![
                Level {
                    robots: vec![Robot {
                        id: 0,
                        space: SpaceType::Real(3),
                        simplification_of: Some(0),
                    }],
                },
                Level {
                    robots: vec![
                        Robot {
                            id: 0,
                            space: SpaceType::Se3,
                            simplification_of: None,
                        },
                        Robot {
                            id: 1,
                            space: SpaceType::Se3,
                            simplification_of: None,
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn render_svg_basic() {
        let config = Config::default();
        let layout = compute_layout(&drones(), &config.layout).unwrap();
        let svg = render_svg(&layout, &config.theme, &config.layout, &config.render);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<text ").count(), layout.scene.texts.len());
        assert_eq!(svg.matches("<line ").count(), layout.scene.lines.len());
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("font-style=\"italic\">SE</tspan>"));
        assert!(svg.contains("baseline-shift=\"super\""));
    }

    #[test]
    fn bounds_cover_axes_box() {
        let config = Config::default();
        let layout = compute_layout(&drones(), &config.layout).unwrap();
        let bounds = tight_bounds(&layout, &config.theme, &config.layout, &config.render);
        let pad = config.render.padding;
        assert!(bounds.min_x <= -pad);
        assert!(bounds.min_y <= -pad);
        assert!(bounds.max_x >= layout.width + pad);
        assert!(bounds.max_y >= layout.height + pad);
    }

    #[test]
    fn canvas_flips_y() {
        let canvas = Canvas {
            bounds: Bounds {
                min_x: -1.0,
                min_y: -1.0,
                max_x: 11.0,
                max_y: 11.0,
            },
            ppu: 2.0,
        };
        assert_eq!(canvas.x(0.0), 2.0);
        assert_eq!(canvas.y(11.0), 0.0);
        assert_eq!(canvas.y(0.0), 22.0);
    }

    #[test]
    fn render_is_deterministic() {
        let config = Config::default();
        let layout = compute_layout(&drones(), &config.layout).unwrap();
        let a = render_svg(&layout, &config.theme, &config.layout, &config.render);
        let b = render_svg(&layout, &config.theme, &config.layout, &config.render);
        assert_eq!(a, b);
    }

    #[test]
    fn escapes_font_family_quotes() {
        assert_eq!(escape_xml("\"A\" & B"), "&quot;A&quot; &amp; B");
    }
}
