//! Feature scaling implementations

use crate::error::{InfluenceError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Column mean
    pub center: f64,
    /// Column population standard deviation
    pub scale: f64,
}

/// Standard scaling (z-score normalization): (x - mean) / std
///
/// Uses the population standard deviation (ddof = 0). A column with zero
/// variance cannot be scaled and is rejected at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data.
    ///
    /// `labels` name the columns in error messages; `matrix` names the matrix
    /// ("design" or "output").
    pub fn fit(&mut self, x: &Array2<f64>, labels: &[String], matrix: &'static str) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(InfluenceError::InvalidInput(format!(
                "cannot fit a scaler on an empty {} matrix",
                matrix
            )));
        }

        let means = x
            .mean_axis(Axis(0))
            .ok_or_else(|| InfluenceError::InvalidInput(format!("empty {} matrix", matrix)))?;
        let stds = x.std_axis(Axis(0), 0.0);

        let mut params = Vec::with_capacity(x.ncols());
        for (j, (&center, &scale)) in means.iter().zip(stds.iter()).enumerate() {
            if !scale.is_finite() || is_constant(scale * scale, center, x.nrows()) {
                let column = labels
                    .get(j)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", j));
                return Err(InfluenceError::DegenerateColumn { matrix, column });
            }
            params.push(ScalerParams { center, scale });
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(x)?;
        let (center, scale) = self.param_arrays();
        Ok((x - &center.insert_axis(Axis(0))) / &scale.insert_axis(Axis(0)))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>, labels: &[String], matrix: &'static str) -> Result<Array2<f64>> {
        self.fit(x, labels, matrix)?;
        self.transform(x)
    }

    /// Map standardized values back to the original units
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(x)?;
        let (center, scale) = self.param_arrays();
        Ok(x * &scale.insert_axis(Axis(0)) + &center.insert_axis(Axis(0)))
    }

    /// Fitted per-column parameters
    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn check_columns(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted {
            return Err(InfluenceError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(InfluenceError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(())
    }

    fn param_arrays(&self) -> (Array1<f64>, Array1<f64>) {
        let center = self.params.iter().map(|p| p.center).collect();
        let scale = self.params.iter().map(|p| p.scale).collect();
        (center, scale)
    }
}

/// Variance no larger than the rounding error of computing it, relative to
/// the column's own magnitude. No absolute floor, so small-unit columns pass.
fn is_constant(var: f64, mean: f64, n_samples: usize) -> bool {
    let n = n_samples as f64;
    let bound = n * f64::EPSILON * var + (n * mean * f64::EPSILON).powi(2);
    var <= bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];

        let mut scaler = StandardScaler::new();
        let result = scaler.fit_transform(&x, &labels(2), "design").unwrap();

        for col in result.columns() {
            let mean = col.mean().unwrap();
            let var = col.mapv(|v| v * v).mean().unwrap() - mean * mean;
            assert!(mean.abs() < 1e-10);
            assert!((var - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_population_std() {
        let x = array![[0.0], [2.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&x, &labels(1), "design").unwrap();
        assert!((scaler.params()[0].scale - 1.0).abs() < 1e-12);
        assert!((scaler.params()[0].center - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_transform() {
        let x = array![[1.0, -3.0], [2.0, 0.5], [4.0, 7.25]];

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &labels(2), "output").unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (o, r) in x.iter().zip(restored.iter()) {
            assert!((o - r).abs() < 1e-10);
        }
    }

    #[test]
    fn test_zero_variance_is_rejected() {
        let x = array![[1.0, 0.1], [2.0, 0.1], [3.0, 0.1]];
        let names = vec!["width".to_string(), "gap".to_string()];

        let mut scaler = StandardScaler::new();
        let err = scaler.fit(&x, &names, "design").unwrap_err();
        match err {
            InfluenceError::DegenerateColumn { matrix, column } => {
                assert_eq!(matrix, "design");
                assert_eq!(column, "gap");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!scaler.is_fitted());
    }

    #[test]
    fn test_small_scale_column_is_accepted() {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| 1e-15 * ((i * (j + 3)) % 7) as f64);
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &labels(2), "design").unwrap();

        for col in scaled.columns() {
            assert!(col.mean().unwrap().abs() < 1e-9);
            assert!((col.mapv(|v| v * v).mean().unwrap() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_large_offset_constant_is_rejected() {
        let x = Array2::from_elem((50, 1), 1.234_567e9);
        let mut scaler = StandardScaler::new();
        assert!(matches!(
            scaler.fit(&x, &labels(1), "output"),
            Err(InfluenceError::DegenerateColumn { .. })
        ));
    }

    #[test]
    fn test_transform_requires_fit() {
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(InfluenceError::ModelNotFitted)
        ));
    }
}
