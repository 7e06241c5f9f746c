//! Analysis session holding the data and both result slots

use super::config::{ForestConfig, SparseJointConfig, SummaryConfig};
use super::observations::{ObservationSet, StandardizedObservations};
use super::results::{CoefficientResult, ImportanceResult, ResultPresence};
use crate::error::{InfluenceError, Result};
use crate::summary::{write_top_influencers, DependencySummary};
use crate::visualization::HeatmapView;
use ndarray::Array2;
use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info};

/// Sensitivity analysis of Hamiltonian parameters against design variables.
///
/// Both matrices are standardized once at construction. Each estimator run
/// replaces its own result slot on success and leaves it untouched on
/// failure; the two slots are independent.
#[derive(Debug, Clone)]
pub struct InfluenceAnalyzer {
    observations: ObservationSet,
    standardized: StandardizedObservations,
    importances: Option<ImportanceResult>,
    coefficients: Option<CoefficientResult>,
}

impl InfluenceAnalyzer {
    /// Validate and standardize the observations.
    ///
    /// Fails on mismatched row counts or labels, non-finite values, and
    /// constant columns.
    pub fn new(
        design: Array2<f64>,
        outputs: Array2<f64>,
        design_labels: Vec<String>,
        output_labels: Vec<String>,
    ) -> Result<Self> {
        let observations = ObservationSet::new(design, outputs, design_labels, output_labels)?;
        Self::from_observations(observations)
    }

    pub fn from_observations(observations: ObservationSet) -> Result<Self> {
        let standardized = observations.standardize()?;
        info!(
            samples = observations.n_samples(),
            design_vars = observations.design_labels().len(),
            outputs = observations.output_labels().len(),
            "Observations standardized"
        );

        Ok(Self {
            observations,
            standardized,
            importances: None,
            coefficients: None,
        })
    }

    pub fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    pub fn standardized(&self) -> &StandardizedObservations {
        &self.standardized
    }

    fn check_estimable(&self) -> Result<()> {
        let n = self.observations.n_samples();
        if n < 2 {
            return Err(InfluenceError::InsufficientSamples { required: 2, actual: n });
        }
        if self.observations.design_labels().is_empty() {
            return Err(InfluenceError::InvalidInput(
                "at least one design variable is required".to_string(),
            ));
        }
        if self.observations.output_labels().is_empty() {
            return Err(InfluenceError::InvalidInput(
                "at least one Hamiltonian parameter is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Fit one forest per output and record its impurity importances.
    ///
    /// Every output uses the same seed, so a rerun with the same config on the
    /// same data reproduces the matrix exactly.
    pub fn run_random_forest(&mut self, config: &ForestConfig) -> Result<&ImportanceResult> {
        self.check_estimable()?;
        let start = Instant::now();
        let x = &self.standardized.design;
        let n_outputs = self.standardized.outputs.ncols();
        let mut matrix = Array2::zeros((x.ncols(), n_outputs));

        for (h, label) in self.observations.output_labels().iter().enumerate() {
            let y = self.standardized.outputs.column(h).to_owned();
            let mut forest = config.build();
            forest.fit(x, &y)?;
            let importances = forest
                .feature_importances()
                .ok_or(InfluenceError::ModelNotFitted)?;
            matrix.column_mut(h).assign(importances);
            debug!(output = %label, trees = forest.n_trees(), "Forest fitted");
        }

        info!(
            outputs = n_outputs,
            trees = config.n_estimators,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Random forest importances computed"
        );

        Ok(self.importances.insert(ImportanceResult {
            matrix,
            design_labels: self.observations.design_labels().to_vec(),
            output_labels: self.observations.output_labels().to_vec(),
            config: config.clone(),
        }))
    }

    /// Fit one multi-task Lasso over all outputs with a cross-validated alpha
    /// and record its signed coefficients.
    pub fn run_multitask_lasso(&mut self, config: &SparseJointConfig) -> Result<&CoefficientResult> {
        self.check_estimable()?;
        let start = Instant::now();
        let mut model = config.build();
        model.fit(&self.standardized.design, &self.standardized.outputs)?;

        let (matrix, intercept, alpha, mse_path) = match (
            model.coefficients(),
            model.intercept(),
            model.alpha(),
            model.mse_path(),
        ) {
            (Some(c), Some(i), Some(a), Some(p)) => (c.clone(), i.clone(), a, p.clone()),
            _ => return Err(InfluenceError::ModelNotFitted),
        };

        info!(
            alpha,
            candidates = model.searched_alphas().len(),
            folds = config.cv_folds,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Multi-task Lasso coefficients computed"
        );

        Ok(self.coefficients.insert(CoefficientResult {
            matrix,
            design_labels: self.observations.design_labels().to_vec(),
            output_labels: self.observations.output_labels().to_vec(),
            intercept,
            alpha,
            alphas: model.searched_alphas().to_vec(),
            mse_path,
            config: config.clone(),
        }))
    }

    pub fn importances(&self) -> Option<&ImportanceResult> {
        self.importances.as_ref()
    }

    pub fn coefficients(&self) -> Option<&CoefficientResult> {
        self.coefficients.as_ref()
    }

    pub fn has_importances(&self) -> bool {
        self.importances.is_some()
    }

    pub fn has_coefficients(&self) -> bool {
        self.coefficients.is_some()
    }

    pub fn presence(&self) -> ResultPresence {
        ResultPresence {
            importances: self.has_importances(),
            coefficients: self.has_coefficients(),
        }
    }

    /// Ranked, thresholded top-k influencers per output for every available
    /// result. Printed to stdout as well when `pretty_print` is set.
    pub fn dependency_summary(&self, config: &SummaryConfig) -> Result<DependencySummary> {
        let summary = DependencySummary::build(
            self.importances.as_ref(),
            self.coefficients.as_ref(),
            config.top_k,
            config.threshold,
        )?;
        if config.pretty_print {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            summary.write_pretty(&mut out)?;
            out.flush()?;
        }
        Ok(summary)
    }

    /// Human-readable top-k listing per output, without thresholding
    pub fn write_dependency_report<W: Write>(&self, writer: &mut W, top_k: usize) -> Result<()> {
        write_top_influencers(
            writer,
            self.importances.as_ref(),
            self.coefficients.as_ref(),
            top_k,
        )
    }

    pub fn print_dependency_summary(&self, top_k: usize) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_dependency_report(&mut out, top_k)?;
        out.flush()?;
        Ok(())
    }

    /// Heatmap layout for whatever results exist
    pub fn heatmap(&self) -> Result<HeatmapView<'_>> {
        HeatmapView::select(self.importances.as_ref(), self.coefficients.as_ref())
    }
}
