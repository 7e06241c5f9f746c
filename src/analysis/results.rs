//! Result matrices produced by the two estimators

use super::config::{ForestConfig, SparseJointConfig};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Score matrix indexed by (design variable, output variable)
pub trait InfluenceScores {
    /// n_design x n_outputs scores
    fn scores(&self) -> &Array2<f64>;

    fn design_labels(&self) -> &[String];

    fn output_labels(&self) -> &[String];

    /// Scores of every design variable for one output
    fn output_column(&self, output: &str) -> Option<ArrayView1<'_, f64>> {
        let h = self.output_labels().iter().position(|l| l == output)?;
        Some(self.scores().column(h))
    }

    /// Score of one (design, output) pair
    fn score(&self, design: &str, output: &str) -> Option<f64> {
        let d = self.design_labels().iter().position(|l| l == design)?;
        let h = self.output_labels().iter().position(|l| l == output)?;
        Some(self.scores()[[d, h]])
    }
}

/// Random forest importances; each column comes from an independent fit and
/// sums to one, so only rankings within a column are comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceResult {
    pub matrix: Array2<f64>,
    pub design_labels: Vec<String>,
    pub output_labels: Vec<String>,
    /// Settings the forests were grown with
    pub config: ForestConfig,
}

impl InfluenceScores for ImportanceResult {
    fn scores(&self) -> &Array2<f64> {
        &self.matrix
    }

    fn design_labels(&self) -> &[String] {
        &self.design_labels
    }

    fn output_labels(&self) -> &[String] {
        &self.output_labels
    }
}

/// Signed multi-task Lasso coefficients from one joint fit with a single
/// cross-validated alpha.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoefficientResult {
    pub matrix: Array2<f64>,
    pub design_labels: Vec<String>,
    pub output_labels: Vec<String>,
    /// Per-output intercepts in standardized units
    pub intercept: Array1<f64>,
    /// Selected regularization strength
    pub alpha: f64,
    /// Candidates in search order (descending)
    pub alphas: Vec<f64>,
    /// Held-out MSE, n_alphas x n_folds
    pub mse_path: Array2<f64>,
    /// Settings of the search
    pub config: SparseJointConfig,
}

impl CoefficientResult {
    /// Mean held-out MSE per candidate alpha
    pub fn mean_mse(&self) -> Vec<f64> {
        self.mse_path
            .rows()
            .into_iter()
            .map(|row| row.mean().unwrap_or(f64::NAN))
            .collect()
    }

    /// Design variables whose coefficients are zero for every output
    pub fn eliminated(&self) -> Vec<&str> {
        self.matrix
            .rows()
            .into_iter()
            .zip(&self.design_labels)
            .filter(|(row, _)| row.iter().all(|&v| v == 0.0))
            .map(|(_, label)| label.as_str())
            .collect()
    }
}

impl InfluenceScores for CoefficientResult {
    fn scores(&self) -> &Array2<f64> {
        &self.matrix
    }

    fn design_labels(&self) -> &[String] {
        &self.design_labels
    }

    fn output_labels(&self) -> &[String] {
        &self.output_labels
    }
}

/// Which result slots are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultPresence {
    pub importances: bool,
    pub coefficients: bool,
}
