//! Design Influence CLI Module
//!
//! Command-line interface for running the sensitivity analysis on CSV tables.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use ndarray::{Array2, Axis};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::analysis::{AnalysisConfig, InfluenceAnalyzer, ObservationSet};
use crate::utils::{column_names, frame_to_matrix, DataLoader};
#[cfg(feature = "plotting")]
use crate::visualization::HeatmapConfig;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "design-influence")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rank which design parameters drive which Hamiltonian parameters")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the estimators and report the top influencers
    Analyze(AnalyzeArgs),

    /// Show the loaded tables and per-column statistics
    Info(DataArgs),
}

/// Which estimators to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Per-output random forest importances
    Rf,
    /// Joint multi-task Lasso coefficients
    Lasso,
    Both,
}

impl Method {
    fn runs_forest(self) -> bool {
        matches!(self, Method::Rf | Method::Both)
    }

    fn runs_lasso(self) -> bool {
        matches!(self, Method::Lasso | Method::Both)
    }
}

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Design parameter table (CSV with header)
    #[arg(short, long)]
    pub design: PathBuf,

    /// Hamiltonian parameter table; omit when --design holds both
    #[arg(short, long)]
    pub outputs: Option<PathBuf>,

    /// Design columns to use (default: all, or all not in --output-columns)
    #[arg(long, value_delimiter = ',')]
    pub design_columns: Vec<String>,

    /// Output columns to use (required without --outputs)
    #[arg(long, value_delimiter = ',')]
    pub output_columns: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(short, long, value_enum, default_value = "both")]
    pub method: Method,

    /// Influencers kept per Hamiltonian parameter
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Minimum |score| kept in the JSON summary
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Trees per random forest
    #[arg(long)]
    pub n_estimators: Option<usize>,

    /// Seed for the forests and fold shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Cross-validation folds for the Lasso alpha search
    #[arg(long)]
    pub cv_folds: Option<usize>,

    /// JSON analysis config; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the dependency summary JSON here
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Print text heatmaps
    #[arg(long)]
    pub heatmap: bool,

    /// Write SVG heatmaps here
    #[arg(long)]
    pub svg: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(k) = self.top_k {
            config.summary.top_k = k;
        }
        if let Some(t) = self.threshold {
            config.summary.threshold = t;
        }
        if let Some(n) = self.n_estimators {
            config.forest.n_estimators = n;
        }
        if let Some(seed) = self.seed {
            config.forest.random_state = seed;
            config.sparse_joint.random_state = seed;
        }
        if let Some(folds) = self.cv_folds {
            config.sparse_joint.cv_folds = folds;
        }
        Ok(config)
    }
}

// ─── Data loading ──────────────────────────────────────────────────────────────

/// Load the design/output tables described by the arguments
pub fn load_observations(args: &DataArgs) -> anyhow::Result<ObservationSet> {
    let loader = DataLoader::new();
    let design_df = loader.load_csv(&args.design)?;

    let observations = match &args.outputs {
        Some(path) => {
            let outputs_df = loader.load_csv(path)?;
            let design_columns = or_all(&args.design_columns, || column_names(&design_df));
            let output_columns = or_all(&args.output_columns, || column_names(&outputs_df));
            ObservationSet::new(
                frame_to_matrix(&design_df, &design_columns)?,
                frame_to_matrix(&outputs_df, &output_columns)?,
                design_columns,
                output_columns,
            )?
        }
        None => {
            if args.output_columns.is_empty() {
                anyhow::bail!("--output-columns is required when --outputs is not given");
            }
            let design_columns = or_all(&args.design_columns, || {
                column_names(&design_df)
                    .into_iter()
                    .filter(|c| !args.output_columns.contains(c))
                    .collect()
            });
            ObservationSet::from_frame_split(&design_df, &design_columns, &args.output_columns)?
        }
    };

    Ok(observations)
}

fn or_all<F: FnOnce() -> Vec<String>>(selected: &[String], all: F) -> Vec<String> {
    if selected.is_empty() {
        all()
    } else {
        selected.to_vec()
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_analyze(args: &AnalyzeArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    section("Analyze");

    step_run("Loading data");
    let start = Instant::now();
    let observations = load_observations(&args.data)?;
    step_done(&format!(
        "{} samples × {} design × {} outputs in {:?}",
        observations.n_samples(),
        observations.design_labels().len(),
        observations.output_labels().len(),
        start.elapsed()
    ));

    let mut analyzer = InfluenceAnalyzer::from_observations(observations)?;

    if args.method.runs_forest() {
        step_run(&format!(
            "Random forest ({} trees per output)",
            config.forest.n_estimators.to_string().cyan()
        ));
        let start = Instant::now();
        analyzer.run_random_forest(&config.forest)?;
        step_done(&format!("{:?}", start.elapsed()));
    }

    if args.method.runs_lasso() {
        step_run(&format!(
            "Multi-task Lasso ({} alphas, {}-fold CV)",
            config.sparse_joint.alphas.len().to_string().cyan(),
            config.sparse_joint.cv_folds
        ));
        let start = Instant::now();
        let result = analyzer.run_multitask_lasso(&config.sparse_joint)?;
        step_done(&format!("alpha = {:.3e} in {:?}", result.alpha, start.elapsed()));
        let eliminated = result.eliminated();
        if !eliminated.is_empty() {
            println!("  {:<16} {}", muted("Eliminated"), eliminated.join(", ").white());
        }
    }

    analyzer.print_dependency_summary(config.summary.top_k)?;
    let summary = analyzer.dependency_summary(&config.summary)?;

    if let Some(path) = &args.json {
        std::fs::write(path, summary.to_json_pretty()?)?;
        step_ok(&format!("Summary → {}", path.display()));
    }

    if args.heatmap || args.svg.is_some() {
        let view = analyzer.heatmap()?;
        if args.heatmap {
            println!();
            let color = colored::control::SHOULD_COLORIZE.should_colorize();
            for line in view.render_text(color).lines() {
                println!("  {}", line);
            }
        }
        if let Some(path) = &args.svg {
            write_svg(&view, path)?;
            step_ok(&format!("Heatmap → {}", path.display()));
        }
    }

    println!();
    Ok(())
}

#[cfg(feature = "plotting")]
fn write_svg(view: &crate::visualization::HeatmapView<'_>, path: &Path) -> anyhow::Result<()> {
    view.render_svg(path, &HeatmapConfig::default())?;
    Ok(())
}

#[cfg(not(feature = "plotting"))]
fn write_svg(_view: &crate::visualization::HeatmapView<'_>, path: &Path) -> anyhow::Result<()> {
    anyhow::bail!(
        "cannot write {}: built without the `plotting` feature",
        path.display()
    )
}

fn print_column_stats(title: &str, matrix: &Array2<f64>, labels: &[String]) {
    println!();
    println!("  {}", title.white().bold());
    println!(
        "  {:<20} {:>12} {:>12} {:>12} {:>12}",
        muted("Column"),
        muted("Mean"),
        muted("Std"),
        muted("Min"),
        muted("Max")
    );
    println!("  {}", dim(&"─".repeat(72)));

    let means = matrix.mean_axis(Axis(0));
    let stds = matrix.std_axis(Axis(0), 0.0);
    for (j, label) in labels.iter().enumerate() {
        let column = matrix.column(j);
        let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = means.as_ref().map(|m| m[j]).unwrap_or(f64::NAN);
        let std = stds[j];
        let std_cell = format!("{:>12.4}", std);
        println!(
            "  {:<20} {:>12.4} {} {:>12.4} {:>12.4}",
            label,
            mean,
            if std == 0.0 { std_cell.yellow() } else { std_cell.normal() },
            min,
            max
        );
    }
}

pub fn cmd_info(args: &DataArgs) -> anyhow::Result<()> {
    section("Data Info");

    let observations = load_observations(args)?;

    println!("  {:<12} {}", muted("Design"), args.design.display());
    if let Some(path) = &args.outputs {
        println!("  {:<12} {}", muted("Outputs"), path.display());
    }
    println!("  {:<12} {}", muted("Samples"), observations.n_samples());
    println!("  {:<12} {}", muted("Design vars"), observations.design_labels().len());
    println!("  {:<12} {}", muted("Outputs"), observations.output_labels().len());

    print_column_stats("Design parameters", observations.design(), observations.design_labels());
    print_column_stats(
        "Hamiltonian parameters",
        observations.outputs(),
        observations.output_labels(),
    );

    if let Err(e) = observations.standardize() {
        println!();
        println!("  {} {}", "!".yellow(), e.to_string().yellow());
    }

    println!();
    Ok(())
}
