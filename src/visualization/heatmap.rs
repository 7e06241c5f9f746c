//! Heatmaps of importance and coefficient matrices

use super::colormap::{prefers_dark_text, ColorMap, ColorScale};
use crate::analysis::{CoefficientResult, ImportanceResult, InfluenceScores};
use crate::error::{InfluenceError, Result};
use colored::Colorize;
use ndarray::Array2;
use std::fmt;

pub const IMPORTANCE_TITLE: &str = "Random Forest: Design Parameter Importance";
pub const COEFFICIENT_TITLE: &str = "Multi-Task Lasso: Design Influence";
pub const X_AXIS: &str = "Hamiltonian Parameter";
pub const Y_AXIS: &str = "Design Parameter";
pub const IMPORTANCE_LEGEND: &str = "Feature Importance";
pub const COEFFICIENT_LEGEND: &str = "Coefficient Value";

/// Which heatmaps to draw, chosen from the available results
#[derive(Debug, Clone, Copy)]
pub enum HeatmapView<'a> {
    /// Importances and coefficients side by side
    Combined {
        importances: &'a ImportanceResult,
        coefficients: &'a CoefficientResult,
    },
    Importance(&'a ImportanceResult),
    Coefficients(&'a CoefficientResult),
}

/// One matrix with its labels, title and color mapping
#[derive(Debug, Clone)]
pub struct HeatmapPanel<'a> {
    pub title: &'static str,
    /// Color bar caption
    pub legend: &'static str,
    pub scores: &'a Array2<f64>,
    pub design_labels: &'a [String],
    pub output_labels: &'a [String],
    pub colormap: ColorMap,
    pub scale: ColorScale,
}

impl<'a> HeatmapPanel<'a> {
    fn importance(result: &'a ImportanceResult) -> Self {
        Self {
            title: IMPORTANCE_TITLE,
            legend: IMPORTANCE_LEGEND,
            scores: result.scores(),
            design_labels: result.design_labels(),
            output_labels: result.output_labels(),
            colormap: ColorMap::YlOrRd,
            scale: ColorScale::linear_over(result.scores().iter()),
        }
    }

    fn coefficients(result: &'a CoefficientResult) -> Self {
        Self {
            title: COEFFICIENT_TITLE,
            legend: COEFFICIENT_LEGEND,
            scores: result.scores(),
            design_labels: result.design_labels(),
            output_labels: result.output_labels(),
            colormap: ColorMap::CoolWarm,
            scale: ColorScale::centered_over(result.scores().iter()),
        }
    }

    /// Fill color of one cell
    pub fn cell_rgb(&self, design: usize, output: usize) -> (u8, u8, u8) {
        self.colormap
            .rgb(self.scale.position(self.scores[[design, output]]))
    }

    fn write_text(&self, out: &mut fmt::Formatter<'_>, color: bool) -> fmt::Result {
        let label_width = self
            .design_labels
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(Y_AXIS.len()))
            .max()
            .unwrap_or(0);
        let cell_width = self
            .output_labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        writeln!(out, "{}", self.title)?;
        writeln!(out, "{:>w$}  ({} →)", "", X_AXIS, w = label_width)?;
        write!(out, "{:<w$}", Y_AXIS, w = label_width)?;
        for label in self.output_labels {
            write!(out, " {:>w$}", label, w = cell_width)?;
        }
        writeln!(out)?;

        for (d, label) in self.design_labels.iter().enumerate() {
            write!(out, "{:<w$}", label, w = label_width)?;
            for h in 0..self.output_labels.len() {
                let cell = format!("{:>w$.3}", self.scores[[d, h]], w = cell_width);
                write!(out, " ")?;
                if color {
                    let rgb = self.cell_rgb(d, h);
                    let painted = cell.on_truecolor(rgb.0, rgb.1, rgb.2);
                    let painted = if prefers_dark_text(rgb) {
                        painted.black()
                    } else {
                        painted.white()
                    };
                    write!(out, "{}", painted)?;
                } else {
                    write!(out, "{}", cell)?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Text rendering of every panel in a view
struct TextGrid<'v, 'a> {
    view: &'v HeatmapView<'a>,
    color: bool,
}

impl fmt::Display for TextGrid<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, panel) in self.view.panels().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            panel.write_text(f, self.color)?;
        }
        Ok(())
    }
}

impl<'a> HeatmapView<'a> {
    /// Combined layout when both results exist, a single panel when one does
    pub fn select(
        importances: Option<&'a ImportanceResult>,
        coefficients: Option<&'a CoefficientResult>,
    ) -> Result<Self> {
        match (importances, coefficients) {
            (Some(importances), Some(coefficients)) => Ok(HeatmapView::Combined {
                importances,
                coefficients,
            }),
            (Some(importances), None) => Ok(HeatmapView::Importance(importances)),
            (None, Some(coefficients)) => Ok(HeatmapView::Coefficients(coefficients)),
            (None, None) => Err(InfluenceError::NothingToDisplay),
        }
    }

    /// Panels in display order, left to right
    pub fn panels(&self) -> Vec<HeatmapPanel<'a>> {
        match *self {
            HeatmapView::Combined {
                importances,
                coefficients,
            } => vec![
                HeatmapPanel::importance(importances),
                HeatmapPanel::coefficients(coefficients),
            ],
            HeatmapView::Importance(r) => vec![HeatmapPanel::importance(r)],
            HeatmapView::Coefficients(r) => vec![HeatmapPanel::coefficients(r)],
        }
    }

    /// Annotated text grid per panel, optionally with truecolor cell
    /// backgrounds
    pub fn render_text(&self, color: bool) -> String {
        TextGrid { view: self, color }.to_string()
    }
}

#[cfg(feature = "plotting")]
mod svg {
    use super::*;
    use plotters::coord::Shift;
    use plotters::prelude::*;
    use plotters::style::text_anchor::{HPos, Pos, VPos};
    use std::path::Path;

    /// Layout of the SVG rendering
    #[derive(Debug, Clone)]
    pub struct HeatmapConfig {
        /// Width of each panel in pixels
        pub panel_width: u32,
        /// Total height; derived from the number of design variables if unset
        pub height: Option<u32>,
        pub font_size: u32,
        /// Space reserved for design-variable labels
        pub label_area: u32,
        /// Write the value inside each cell
        pub annotate: bool,
    }

    impl Default for HeatmapConfig {
        fn default() -> Self {
            Self {
                panel_width: 600,
                height: None,
                font_size: 14,
                label_area: 140,
                annotate: true,
            }
        }
    }

    impl HeatmapConfig {
        fn size(&self, panels: &[HeatmapPanel<'_>]) -> (u32, u32) {
            let rows = panels
                .iter()
                .map(|p| p.design_labels.len())
                .max()
                .unwrap_or(1) as u32;
            let height = self.height.unwrap_or_else(|| (140 + 40 * rows).max(400));
            (self.panel_width * panels.len().max(1) as u32, height)
        }
    }

    /// Pixels taken from the right of each panel for its color bar
    const COLORBAR_WIDTH: u32 = 110;
    const COLORBAR_STEPS: usize = 64;

    fn plot_err<E: std::fmt::Display>(e: E) -> InfluenceError {
        InfluenceError::PlottingError(e.to_string())
    }

    /// Vertical legend strip: palette gradient with a value axis and caption
    fn draw_colorbar<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &HeatmapPanel<'_>,
        config: &HeatmapConfig,
    ) -> Result<()> {
        let (lo, hi) = panel.scale.range();
        // A flat matrix still gets a readable axis
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };

        let mut bar = ChartBuilder::on(area)
            .margin_top(config.font_size + 30)
            .margin_bottom(60)
            .margin_right(10)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..1.0, lo..hi)
            .map_err(plot_err)?;

        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(5)
            .y_desc(panel.legend)
            .label_style(("sans-serif", config.font_size.saturating_sub(2).max(8)))
            .y_label_formatter(&|v| format!("{:.2}", v))
            .draw()
            .map_err(plot_err)?;

        let step = (hi - lo) / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|i| {
            let from = lo + step * i as f64;
            let (r, g, b) = panel.colormap.rgb(panel.scale.position(from + step / 2.0));
            Rectangle::new([(0.0, from), (1.0, from + step)], RGBColor(r, g, b).filled())
        }))
        .map_err(plot_err)?;

        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &HeatmapPanel<'_>,
        config: &HeatmapConfig,
    ) -> Result<()> {
        let n_design = panel.design_labels.len();
        let n_outputs = panel.output_labels.len();
        // Row 0 is drawn at the top
        let row = |d: usize| n_design - 1 - d;

        let mut chart = ChartBuilder::on(area)
            .caption(panel.title, ("sans-serif", config.font_size + 4).into_font())
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(config.label_area)
            .build_cartesian_2d((0..n_outputs).into_segmented(), (0..n_design).into_segmented())
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(n_outputs)
            .y_labels(n_design)
            .x_desc(X_AXIS)
            .y_desc(Y_AXIS)
            .label_style(("sans-serif", config.font_size))
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(h) => panel.output_labels.get(*h).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| match y {
                SegmentValue::CenterOf(r) if *r < n_design => {
                    panel.design_labels[row(*r)].clone()
                }
                _ => String::new(),
            })
            .draw()
            .map_err(plot_err)?;

        let cells: Vec<(usize, usize)> = (0..n_design)
            .flat_map(|d| (0..n_outputs).map(move |h| (d, h)))
            .collect();

        chart
            .draw_series(cells.iter().map(|&(d, h)| {
                let (r, g, b) = panel.cell_rgb(d, h);
                Rectangle::new(
                    [
                        (SegmentValue::Exact(h), SegmentValue::Exact(row(d))),
                        (SegmentValue::Exact(h + 1), SegmentValue::Exact(row(d) + 1)),
                    ],
                    RGBColor(r, g, b).filled(),
                )
            }))
            .map_err(plot_err)?;

        if config.annotate {
            let base = TextStyle::from(("sans-serif", config.font_size).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart
                .draw_series(cells.iter().map(|&(d, h)| {
                    let style = if prefers_dark_text(panel.cell_rgb(d, h)) {
                        base.color(&BLACK)
                    } else {
                        base.color(&WHITE)
                    };
                    Text::new(
                        format!("{:.2}", panel.scores[[d, h]]),
                        (SegmentValue::CenterOf(h), SegmentValue::CenterOf(row(d))),
                        style,
                    )
                }))
                .map_err(plot_err)?;
        }

        Ok(())
    }

    fn draw_all<DB: DrawingBackend>(
        root: DrawingArea<DB, Shift>,
        panels: &[HeatmapPanel<'_>],
        config: &HeatmapConfig,
    ) -> Result<()> {
        root.fill(&WHITE).map_err(plot_err)?;
        let areas = root.split_evenly((1, panels.len()));
        for (area, panel) in areas.iter().zip(panels) {
            let width = area.dim_in_pixel().0;
            let (cells, legend) = area.split_horizontally(width.saturating_sub(COLORBAR_WIDTH));
            draw_panel(&cells, panel, config)?;
            draw_colorbar(&legend, panel, config)?;
        }
        root.present().map_err(plot_err)?;
        Ok(())
    }

    impl<'a> HeatmapView<'a> {
        /// Write the heatmaps to an SVG file
        pub fn render_svg<P: AsRef<Path>>(&self, path: P, config: &HeatmapConfig) -> Result<()> {
            let panels = self.panels();
            let root = SVGBackend::new(path.as_ref(), config.size(&panels)).into_drawing_area();
            draw_all(root, &panels, config)
        }

        /// SVG document as a string
        pub fn to_svg_string(&self, config: &HeatmapConfig) -> Result<String> {
            let panels = self.panels();
            let mut buf = String::new();
            {
                let root = SVGBackend::with_string(&mut buf, config.size(&panels)).into_drawing_area();
                draw_all(root, &panels, config)?;
            }
            Ok(buf)
        }
    }
}

#[cfg(feature = "plotting")]
pub use svg::HeatmapConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ForestConfig, SparseJointConfig};
    use ndarray::array;

    fn importances() -> ImportanceResult {
        ImportanceResult {
            matrix: array![[0.8, 0.3], [0.2, 0.7]],
            design_labels: vec!["width".into(), "gap".into()],
            output_labels: vec!["f_q".into(), "anh".into()],
            config: ForestConfig::default(),
        }
    }

    fn coefficients() -> CoefficientResult {
        CoefficientResult {
            matrix: array![[0.6, 0.0], [-0.3, 0.1]],
            design_labels: vec!["width".into(), "gap".into()],
            output_labels: vec!["f_q".into(), "anh".into()],
            intercept: array![0.0, 0.0],
            alpha: 0.1,
            alphas: vec![0.1],
            mse_path: Array2::zeros((1, 3)),
            config: SparseJointConfig::default(),
        }
    }

    #[test]
    fn test_select_dispatch() {
        let imp = importances();
        let coef = coefficients();
        assert!(matches!(
            HeatmapView::select(Some(&imp), Some(&coef)),
            Ok(HeatmapView::Combined { .. })
        ));
        assert!(matches!(
            HeatmapView::select(Some(&imp), None),
            Ok(HeatmapView::Importance(_))
        ));
        assert!(matches!(
            HeatmapView::select(None, Some(&coef)),
            Ok(HeatmapView::Coefficients(_))
        ));
        assert!(matches!(
            HeatmapView::select(None, None),
            Err(InfluenceError::NothingToDisplay)
        ));
    }

    #[test]
    fn test_panels_and_palettes() {
        let imp = importances();
        let coef = coefficients();
        let panels = HeatmapView::select(Some(&imp), Some(&coef)).unwrap().panels();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].title, IMPORTANCE_TITLE);
        assert_eq!(panels[0].colormap, ColorMap::YlOrRd);
        assert_eq!(panels[1].title, COEFFICIENT_TITLE);
        // Zero coefficient maps to the diverging midpoint
        assert_eq!(panels[1].cell_rgb(0, 1), ColorMap::CoolWarm.rgb(0.5));
    }

    #[test]
    fn test_render_text_plain() {
        let coef = coefficients();
        let text = HeatmapView::select(None, Some(&coef)).unwrap().render_text(false);
        assert!(text.starts_with(COEFFICIENT_TITLE));
        assert!(text.contains("-0.300"));
        assert!(text.contains("width"));
        assert!(!text.contains(IMPORTANCE_TITLE));
    }

    #[cfg(feature = "plotting")]
    #[test]
    fn test_svg_contains_titles() {
        let imp = importances();
        let coef = coefficients();
        let svg = HeatmapView::select(Some(&imp), Some(&coef))
            .unwrap()
            .to_svg_string(&HeatmapConfig::default())
            .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(IMPORTANCE_TITLE));
        assert!(svg.contains(COEFFICIENT_TITLE));
        assert!(svg.contains(IMPORTANCE_LEGEND));
        assert!(svg.contains(COEFFICIENT_LEGEND));
    }

    #[cfg(feature = "plotting")]
    #[test]
    fn test_svg_single_panel_legend() {
        let imp = importances();
        let svg = HeatmapView::select(Some(&imp), None)
            .unwrap()
            .to_svg_string(&HeatmapConfig::default())
            .unwrap();
        assert!(svg.contains(IMPORTANCE_LEGEND));
        assert!(!svg.contains(COEFFICIENT_LEGEND));
    }

    #[test]
    fn test_panel_legends() {
        let imp = importances();
        let coef = coefficients();
        let panels = HeatmapView::select(Some(&imp), Some(&coef)).unwrap().panels();
        assert_eq!(panels[0].legend, IMPORTANCE_LEGEND);
        assert_eq!(panels[1].legend, COEFFICIENT_LEGEND);
        assert_eq!(panels[1].scale.range(), (-0.6, 0.6));
    }

    #[test]
    fn test_render_text_combined_order() {
        let imp = importances();
        let coef = coefficients();
        let text = HeatmapView::select(Some(&imp), Some(&coef))
            .unwrap()
            .render_text(false);
        let first = text.find(IMPORTANCE_TITLE).unwrap();
        let second = text.find(COEFFICIENT_TITLE).unwrap();
        assert!(first < second);
        assert!(text.contains("\n\n"));
    }
}
