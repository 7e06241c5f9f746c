//! Design Influence - design-to-Hamiltonian sensitivity analysis
//!
//! Given paired observations of device design variables and the Hamiltonian
//! parameters they produce, this crate finds which design variables drive
//! which outputs through two complementary regression views:
//! - per-output Random Forest impurity importances (non-linear, unsigned)
//! - a joint multi-task Lasso with a cross-validated shared alpha (linear,
//!   signed, sparse across all outputs at once)
//!
//! # Modules
//!
//! ## Core
//! - [`analysis`] - Observations, configuration, and the [`InfluenceAnalyzer`] session
//! - [`summary`] - Ranked top-k dependency summaries (JSON and text)
//! - [`visualization`] - Heatmaps of the result matrices (text, SVG)
//!
//! ## Services
//! - [`preprocessing`] - Column standardization
//! - [`training`] - Regression trees, forests, multi-task Lasso, K-fold CV
//! - [`utils`] - CSV loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use design_influence::prelude::*;
//! use ndarray::Array2;
//!
//! # fn main() -> design_influence::Result<()> {
//! let design = Array2::<f64>::zeros((100, 3));
//! let outputs = Array2::<f64>::zeros((100, 2));
//! let mut analyzer = InfluenceAnalyzer::new(
//!     design,
//!     outputs,
//!     vec!["width".into(), "gap".into(), "length".into()],
//!     vec!["f_q".into(), "anharmonicity".into()],
//! )?;
//! analyzer.run_random_forest(&ForestConfig::default())?;
//! analyzer.run_multitask_lasso(&SparseJointConfig::default())?;
//! let summary = analyzer.dependency_summary(&SummaryConfig::default())?;
//! println!("{}", summary.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Core analysis
pub mod analysis;
pub mod summary;
pub mod visualization;

// Regression services
pub mod preprocessing;
pub mod training;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use analysis::InfluenceAnalyzer;
pub use error::{InfluenceError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{InfluenceError, Result};

    // Analysis
    pub use crate::analysis::{
        AnalysisConfig, CoefficientResult, ForestConfig, ImportanceResult, InfluenceAnalyzer,
        InfluenceScores, ObservationSet, ResultPresence, SparseJointConfig, SummaryConfig,
    };

    // Summaries
    pub use crate::summary::{CoefficientEntry, DependencySummary, ImportanceEntry};

    // Visualization
    pub use crate::visualization::{HeatmapPanel, HeatmapView};
    #[cfg(feature = "plotting")]
    pub use crate::visualization::HeatmapConfig;

    // Regression services
    pub use crate::preprocessing::StandardScaler;
    pub use crate::training::{KFold, MaxFeatures, MultiTaskLasso, MultiTaskLassoCV, RandomForest};

    // Data loading
    pub use crate::utils::DataLoader;
}
