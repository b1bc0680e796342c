use crate::config::{Config, load_config};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_hierarchy;
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fbdiag",
    version,
    about = "Fiber bundle diagrams of robot configuration space hierarchies"
)]
pub struct Args {
    /// Hierarchy XML files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Label font size in points
    #[arg(short = 'f', long = "font-size")]
    pub font_size: Option<f32>,

    /// Vertical step between levels
    #[arg(short = 'y', long = "row-step")]
    pub row_step: Option<f32>,

    /// Horizontal step per dimension unit
    #[arg(short = 'x', long = "column-step")]
    pub column_step: Option<f32>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "output-format", value_enum, default_value = "png")]
    pub output_format: OutputFormat,

    /// Directory for output files. Defaults to next to each input.
    #[arg(short = 'O', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Write the computed layout as JSON (single input only)
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    if args.dump_layout.is_some() && args.inputs.len() > 1 {
        return Err(anyhow::anyhow!("--dump-layout requires a single input"));
    }

    for input in &args.inputs {
        let output = output_path(input, args.output_dir.as_deref(), args.output_format);
        render_file(input, &output, args.output_format, &config, args.dump_layout.as_deref())
            .with_context(|| format!("failed to render {}", input.display()))?;
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(v) = args.font_size {
        config.layout.font_size = v;
    }
    if let Some(v) = args.row_step {
        config.layout.row_step = v;
    }
    if let Some(v) = args.column_step {
        config.layout.column_step = v;
    }
    if !is_positive(config.layout.row_step) || !is_positive(config.layout.column_step) {
        return Err(anyhow::anyhow!("row and column steps must be positive"));
    }
    Ok(config)
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn render_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: &Config,
    dump: Option<&Path>,
) -> Result<()> {
    let xml = std::fs::read_to_string(input)?;
    let hierarchy = parse_hierarchy(&xml)?;
    tracing::info!(
        input = %input.display(),
        levels = hierarchy.levels.len(),
        state_dimension = hierarchy.state_dimension(),
        "parsed hierarchy"
    );

    let layout = compute_layout(&hierarchy, &config.layout)?;
    if let Some(path) = dump {
        write_layout_dump(path, &layout, &hierarchy)?;
    }
    let svg = render_svg(&layout, &config.theme, &config.layout, &config.render);
    match format {
        OutputFormat::Svg => write_output_svg(&svg, output)?,
        OutputFormat::Png => write_png(&svg, output, config)?,
    }
    tracing::info!(output = %output.display(), "wrote diagram");
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature; use --output-format svg"
    ))
}

/// `<input>.<ext>`, appending to the full file name so `a.xml` becomes
/// `a.xml.png`.
fn output_path(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let mut name: OsString = match output_dir {
        Some(_) => input
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("diagram")),
        None => input.as_os_str().to_os_string(),
    };
    name.push(".");
    name.push(format.extension());
    match output_dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_appends_extension() {
        let path = output_path(Path::new("data/12D_drones_tree.xml"), None, OutputFormat::Png);
        assert_eq!(path, PathBuf::from("data/12D_drones_tree.xml.png"));
    }

    #[test]
    fn output_dir_keeps_file_name() {
        let path = output_path(
            Path::new("data/06D_square.xml"),
            Some(Path::new("figures")),
            OutputFormat::Svg,
        );
        assert_eq!(path, PathBuf::from("figures/06D_square.xml.svg"));
    }

    #[test]
    fn cli_knobs_override_config() {
        let args = Args::parse_from(["fbdiag", "-f", "30", "-y", "20", "-x", "5", "a.xml"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.layout.font_size, 30.0);
        assert_eq!(config.layout.row_step, 20.0);
        assert_eq!(config.layout.column_step, 5.0);
        assert_eq!(args.output_format, OutputFormat::Png);
    }

    #[test]
    fn rejects_non_positive_steps() {
        let args = Args::parse_from(["fbdiag", "--column-step", "0", "a.xml"]);
        assert!(resolve_config(&args).is_err());
        let args = Args::parse_from(["fbdiag", "-x", "NaN", "a.xml"]);
        assert!(resolve_config(&args).is_err());
        let args = Args::parse_from(["fbdiag", "-y", "inf", "a.xml"]);
        assert!(resolve_config(&args).is_err());
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fbdiag-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn render_file_writes_svg() {
        let dir = scratch_dir("svg");
        let input = fixture("06D_bhattacharya_square.xml");
        let output = output_path(&input, Some(&dir), OutputFormat::Svg);
        render_file(&input, &output, OutputFormat::Svg, &Config::default(), None).unwrap();

        assert!(output.ends_with("06D_bhattacharya_square.xml.svg"));
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.starts_with("<svg"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(feature = "png")]
    #[test]
    fn render_file_writes_png() {
        let dir = scratch_dir("png");
        let input = fixture("12D_drones_tree.xml");
        let output = output_path(&input, Some(&dir), OutputFormat::Png);
        render_file(&input, &output, OutputFormat::Png, &Config::default(), None).unwrap();

        assert!(output.ends_with("12D_drones_tree.xml.png"));
        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
