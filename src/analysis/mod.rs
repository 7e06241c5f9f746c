//! Design-to-Hamiltonian sensitivity analysis
//!
//! An [`InfluenceAnalyzer`] owns one standardized [`ObservationSet`] and two
//! independent result slots:
//! - per-output random forest importances ([`ImportanceResult`])
//! - joint multi-task Lasso coefficients ([`CoefficientResult`])

pub mod config;
pub mod observations;
pub mod results;
pub mod session;

pub use config::{AnalysisConfig, ForestConfig, SparseJointConfig, SummaryConfig};
pub use observations::{ObservationSet, StandardizedObservations};
pub use results::{CoefficientResult, ImportanceResult, InfluenceScores, ResultPresence};
pub use session::InfluenceAnalyzer;
