//! Heatmap rendering of analysis results
//!
//! Text grids always; SVG files with the `plotting` feature.

pub mod colormap;
pub mod heatmap;

pub use colormap::{ColorMap, ColorScale};
#[cfg(feature = "plotting")]
pub use heatmap::HeatmapConfig;
pub use heatmap::{HeatmapPanel, HeatmapView};
