//! Paired design/output observations

use crate::error::{InfluenceError, Result};
use crate::preprocessing::StandardScaler;
use crate::utils::{column_names, frame_to_matrix};
use ndarray::Array2;
use polars::prelude::DataFrame;

/// Design matrix and Hamiltonian-parameter matrix, one row per sample.
///
/// Row counts match, label lists match the column counts, and every value is
/// finite. Nothing is mutable after construction.
#[derive(Debug, Clone)]
pub struct ObservationSet {
    design: Array2<f64>,
    outputs: Array2<f64>,
    design_labels: Vec<String>,
    output_labels: Vec<String>,
}

impl ObservationSet {
    pub fn new(
        design: Array2<f64>,
        outputs: Array2<f64>,
        design_labels: Vec<String>,
        output_labels: Vec<String>,
    ) -> Result<Self> {
        if design.nrows() != outputs.nrows() {
            return Err(InfluenceError::ShapeError {
                expected: format!("{} output rows (one per design row)", design.nrows()),
                actual: format!("{} output rows", outputs.nrows()),
            });
        }
        if design_labels.len() != design.ncols() {
            return Err(InfluenceError::LabelMismatch {
                matrix: "design",
                labels: design_labels.len(),
                columns: design.ncols(),
            });
        }
        if output_labels.len() != outputs.ncols() {
            return Err(InfluenceError::LabelMismatch {
                matrix: "output",
                labels: output_labels.len(),
                columns: outputs.ncols(),
            });
        }
        if let Some(v) = design.iter().chain(outputs.iter()).find(|v| !v.is_finite()) {
            return Err(InfluenceError::InvalidInput(format!(
                "observations must be finite, found {}",
                v
            )));
        }

        Ok(Self {
            design,
            outputs,
            design_labels,
            output_labels,
        })
    }

    /// Build from two frames; every column of each frame is used and the
    /// column names become the labels.
    pub fn from_frames(design: &DataFrame, outputs: &DataFrame) -> Result<Self> {
        let design_labels = column_names(design);
        let output_labels = column_names(outputs);
        Self::new(
            frame_to_matrix(design, &design_labels)?,
            frame_to_matrix(outputs, &output_labels)?,
            design_labels,
            output_labels,
        )
    }

    /// Build from one frame holding both design and output columns
    pub fn from_frame_split(df: &DataFrame, design_columns: &[String], output_columns: &[String]) -> Result<Self> {
        Self::new(
            frame_to_matrix(df, design_columns)?,
            frame_to_matrix(df, output_columns)?,
            design_columns.to_vec(),
            output_columns.to_vec(),
        )
    }

    pub fn design(&self) -> &Array2<f64> {
        &self.design
    }

    pub fn outputs(&self) -> &Array2<f64> {
        &self.outputs
    }

    pub fn design_labels(&self) -> &[String] {
        &self.design_labels
    }

    pub fn output_labels(&self) -> &[String] {
        &self.output_labels
    }

    pub fn n_samples(&self) -> usize {
        self.design.nrows()
    }

    /// Standardize both matrices independently
    pub fn standardize(&self) -> Result<StandardizedObservations> {
        let mut design_scaler = StandardScaler::new();
        let design = design_scaler.fit_transform(&self.design, &self.design_labels, "design")?;
        let mut output_scaler = StandardScaler::new();
        let outputs = output_scaler.fit_transform(&self.outputs, &self.output_labels, "output")?;

        Ok(StandardizedObservations {
            design,
            outputs,
            design_scaler,
            output_scaler,
        })
    }
}

/// Standardized matrices and the scalers fitted to produce them
#[derive(Debug, Clone)]
pub struct StandardizedObservations {
    pub design: Array2<f64>,
    pub outputs: Array2<f64>,
    pub design_scaler: StandardScaler,
    pub output_scaler: StandardScaler,
}
