#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod label;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod space;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use layout::{Layout, compute_layout};
pub use parser::parse_hierarchy;
pub use render::render_svg;
pub use space::{SpaceType, infer_fiber};
pub use theme::Theme;
