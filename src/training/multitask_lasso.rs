//! Multi-task Lasso (joint L1/L2 regularization via block coordinate descent)
//!
//! Minimizes `(1 / 2n) ||Y - XW - b||²_F + alpha * Σ_j ||W_j||₂`, where `W_j`
//! is the row of coefficients of feature `j` across all tasks. The group
//! penalty zeroes a feature for every task at once.

use super::cross_validation::{CVResults, KFold};
use crate::error::{InfluenceError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Multi-task Lasso at a fixed regularization strength
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiTaskLasso {
    /// Coefficients, n_features x n_tasks
    pub coefficients: Option<Array2<f64>>,
    /// Per-task intercepts
    pub intercept: Option<Array1<f64>>,
    pub fit_intercept: bool,
    /// Group-L1 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    /// Coordinate-descent sweeps used by the last fit
    pub n_iter: usize,
    pub is_fitted: bool,
}

impl Default for MultiTaskLasso {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MultiTaskLasso {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            alpha,
            max_iter: 1000,
            tol: 1e-4,
            n_iter: 0,
            is_fitted: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Fit from a zero initialization
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<&mut Self> {
        self.fit_warm(x.view(), y.view(), None)
    }

    /// Fit starting from `init` coefficients (n_features x n_tasks)
    pub fn fit_warm(
        &mut self,
        x: ArrayView2<f64>,
        y: ArrayView2<f64>,
        init: Option<&Array2<f64>>,
    ) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_tasks = y.ncols();

        if n_samples != y.nrows() {
            return Err(InfluenceError::ShapeError {
                expected: format!("y rows = {}", n_samples),
                actual: format!("y rows = {}", y.nrows()),
            });
        }
        if n_samples == 0 || n_features == 0 || n_tasks == 0 {
            return Err(InfluenceError::InvalidInput(format!(
                "empty problem: {} samples, {} features, {} tasks",
                n_samples, n_features, n_tasks
            )));
        }
        validate_alpha(self.alpha)?;

        let (x_c, y_c, x_mean, y_mean) = if self.fit_intercept {
            let xm = x
                .mean_axis(Axis(0))
                .ok_or_else(|| InfluenceError::InvalidInput("empty design matrix".to_string()))?;
            let ym = y
                .mean_axis(Axis(0))
                .ok_or_else(|| InfluenceError::InvalidInput("empty target matrix".to_string()))?;
            let xc = &x - &xm.view().insert_axis(Axis(0));
            let yc = &y - &ym.view().insert_axis(Axis(0));
            (xc, yc, xm, ym)
        } else {
            (x.to_owned(), y.to_owned(), Array1::zeros(n_features), Array1::zeros(n_tasks))
        };

        let mut w = match init {
            Some(w0) if w0.dim() == (n_features, n_tasks) => w0.clone(),
            Some(w0) => {
                return Err(InfluenceError::ShapeError {
                    expected: format!("init {:?}", (n_features, n_tasks)),
                    actual: format!("init {:?}", w0.dim()),
                })
            }
            None => Array2::zeros((n_features, n_tasks)),
        };

        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_c.column(j).mapv(|v| v * v).sum())
            .collect();

        let l1_reg = self.alpha * n_samples as f64;
        let gap_tol = self.tol * y_c.mapv(|v| v * v).sum();
        let mut r = &y_c - &x_c.dot(&w);

        let mut converged = false;
        let mut n_iter = 0;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;
            let mut w_max = 0.0f64;
            let mut d_w_max = 0.0f64;

            for j in 0..n_features {
                if col_norms[j] == 0.0 {
                    continue;
                }
                let x_j = x_c.column(j);
                let w_old = w.row(j).to_owned();

                // tmp = X_j^T R + ||X_j||² W_j
                let mut tmp = x_j.dot(&r);
                tmp.scaled_add(col_norms[j], &w_old);

                let nrm = tmp.mapv(|v| v * v).sum().sqrt();
                let shrink = if nrm > 0.0 { (1.0 - l1_reg / nrm).max(0.0) } else { 0.0 };
                let w_new = tmp * (shrink / col_norms[j]);

                let delta = &w_new - &w_old;
                if delta.iter().any(|&d| d != 0.0) {
                    for (mut r_row, &xij) in r.rows_mut().into_iter().zip(x_j.iter()) {
                        r_row.scaled_add(-xij, &delta);
                    }
                }

                d_w_max = d_w_max.max(delta.iter().fold(0.0f64, |m, &d| m.max(d.abs())));
                w_max = w_max.max(w_new.iter().fold(0.0f64, |m, &v| m.max(v.abs())));
                w.row_mut(j).assign(&w_new);
            }

            if w_max == 0.0 || d_w_max / w_max <= self.tol || iter + 1 == self.max_iter {
                let gap = duality_gap(&x_c, &y_c, &r, &w, l1_reg);
                if gap <= gap_tol {
                    converged = true;
                    break;
                }
            }
        }

        if converged {
            debug!(alpha = self.alpha, n_iter, "Multi-task Lasso converged");
        } else {
            warn!(
                alpha = self.alpha,
                max_iter = self.max_iter,
                "Multi-task Lasso did not converge; using last iterate"
            );
        }

        self.intercept = Some(&y_mean - &x_mean.dot(&w));
        self.coefficients = Some(w);
        self.n_iter = n_iter;
        self.is_fitted = true;
        Ok(self)
    }

    /// Predict all tasks, n_samples x n_tasks
    pub fn predict(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>> {
        match (&self.coefficients, &self.intercept) {
            (Some(w), Some(b)) if self.is_fitted => {
                if x.ncols() != w.nrows() {
                    return Err(InfluenceError::ShapeError {
                        expected: format!("{} features", w.nrows()),
                        actual: format!("{} features", x.ncols()),
                    });
                }
                Ok(x.dot(w) + &b.view().insert_axis(Axis(0)))
            }
            _ => Err(InfluenceError::ModelNotFitted),
        }
    }

    /// Mean squared error over every sample and task
    pub fn mse(&self, x: &ArrayView2<f64>, y: &ArrayView2<f64>) -> Result<f64> {
        let p = self.predict(x)?;
        Ok((&p - y).mapv(|v| v * v).mean().unwrap_or(0.0))
    }
}

/// Duality gap of the multi-task Lasso problem scaled by n_samples
fn duality_gap(x: &Array2<f64>, y: &Array2<f64>, r: &Array2<f64>, w: &Array2<f64>, l1_reg: f64) -> f64 {
    let xt_a = x.t().dot(r);
    let dual_norm = xt_a
        .rows()
        .into_iter()
        .map(|row| row.mapv(|v| v * v).sum().sqrt())
        .fold(0.0f64, f64::max);

    let r_norm2 = r.mapv(|v| v * v).sum();
    let (konst, mut gap) = if dual_norm > l1_reg {
        let c = l1_reg / dual_norm;
        (c, 0.5 * r_norm2 * (1.0 + c * c))
    } else {
        (1.0, r_norm2)
    };

    let ry_sum = (r * y).sum();
    let l21_norm: f64 = w
        .rows()
        .into_iter()
        .map(|row| row.mapv(|v| v * v).sum().sqrt())
        .sum();

    gap += l1_reg * l21_norm - konst * ry_sum;
    gap
}

fn validate_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(InfluenceError::InvalidParameter {
            name: "alpha".to_string(),
            value: alpha.to_string(),
            reason: "must be a positive finite number".to_string(),
        });
    }
    Ok(())
}

/// `n` values log-spaced from 10^start to 10^stop inclusive
pub fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![10f64.powf(start)],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| 10f64.powf(start + step * i as f64)).collect()
        }
    }
}

/// Multi-task Lasso with one shared alpha chosen by K-fold cross-validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiTaskLassoCV {
    /// Candidate regularization strengths
    pub alphas: Vec<f64>,
    /// Fold generator
    pub cv: KFold,
    pub fit_intercept: bool,
    pub max_iter: usize,
    pub tol: f64,
    /// Selected alpha
    alpha: Option<f64>,
    /// Candidates in search order (descending)
    searched_alphas: Vec<f64>,
    /// Held-out MSE, n_alphas x n_folds, rows in search order
    mse_path: Option<Array2<f64>>,
    /// Model refit on all samples at the selected alpha
    model: Option<MultiTaskLasso>,
}

impl Default for MultiTaskLassoCV {
    fn default() -> Self {
        Self::new(logspace(-4.0, 1.0, 20))
    }
}

impl MultiTaskLassoCV {
    pub fn new(alphas: Vec<f64>) -> Self {
        Self {
            alphas,
            cv: KFold::new(5),
            fit_intercept: true,
            max_iter: 1000,
            tol: 1e-4,
            alpha: None,
            searched_alphas: Vec::new(),
            mse_path: None,
            model: None,
        }
    }

    pub fn with_cv(mut self, cv: KFold) -> Self {
        self.cv = cv;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    fn base_model(&self, alpha: f64) -> MultiTaskLasso {
        MultiTaskLasso::new(alpha)
            .with_max_iter(self.max_iter)
            .with_tol(self.tol)
            .with_fit_intercept(self.fit_intercept)
    }

    /// Search the alpha grid, then refit on all samples at the best alpha.
    ///
    /// Alphas are searched from largest to smallest with warm starts inside
    /// each fold; the first alpha reaching the minimum mean held-out MSE wins.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<&mut Self> {
        if self.alphas.is_empty() {
            return Err(InfluenceError::InvalidParameter {
                name: "alphas".to_string(),
                value: "[]".to_string(),
                reason: "the candidate grid is empty".to_string(),
            });
        }
        for &a in &self.alphas {
            validate_alpha(a)?;
        }
        if x.nrows() != y.nrows() {
            return Err(InfluenceError::ShapeError {
                expected: format!("y rows = {}", x.nrows()),
                actual: format!("y rows = {}", y.nrows()),
            });
        }

        let splits = self.cv.split(x.nrows())?;

        let mut alphas = self.alphas.clone();
        alphas.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let fold_paths: Vec<Vec<f64>> = splits
            .par_iter()
            .map(|split| -> Result<Vec<f64>> {
                let x_train = x.select(Axis(0), &split.train_indices);
                let y_train = y.select(Axis(0), &split.train_indices);
                let x_test = x.select(Axis(0), &split.test_indices);
                let y_test = y.select(Axis(0), &split.test_indices);

                let mut warm: Option<Array2<f64>> = None;
                let mut path = Vec::with_capacity(alphas.len());
                for &alpha in &alphas {
                    let mut model = self.base_model(alpha);
                    model.fit_warm(x_train.view(), y_train.view(), warm.as_ref())?;
                    path.push(model.mse(&x_test.view(), &y_test.view())?);
                    warm = model.coefficients.take();
                }
                Ok(path)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut mse_path = Array2::zeros((alphas.len(), splits.len()));
        for (fold, path) in fold_paths.iter().enumerate() {
            for (a_idx, &mse) in path.iter().enumerate() {
                mse_path[[a_idx, fold]] = mse;
            }
        }

        let mut best_idx = 0;
        let mut best_mse = f64::INFINITY;
        for (a_idx, row) in mse_path.rows().into_iter().enumerate() {
            let mean = CVResults::from_scores(row.to_vec()).mean_score;
            if mean < best_mse {
                best_mse = mean;
                best_idx = a_idx;
            }
        }
        let best_alpha = alphas[best_idx];
        debug!(alpha = best_alpha, mse = best_mse, "Selected regularization strength");

        let mut model = self.base_model(best_alpha);
        model.fit(x, y)?;

        self.alpha = Some(best_alpha);
        self.searched_alphas = alphas;
        self.mse_path = Some(mse_path);
        self.model = Some(model);
        Ok(self)
    }

    /// Selected alpha
    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    /// Candidates in the order they were searched
    pub fn searched_alphas(&self) -> &[f64] {
        &self.searched_alphas
    }

    /// Held-out MSE per candidate and fold
    pub fn mse_path(&self) -> Option<&Array2<f64>> {
        self.mse_path.as_ref()
    }

    /// Coefficients of the refit model, n_features x n_tasks
    pub fn coefficients(&self) -> Option<&Array2<f64>> {
        self.model.as_ref().and_then(|m| m.coefficients.as_ref())
    }

    pub fn intercept(&self) -> Option<&Array1<f64>> {
        self.model.as_ref().and_then(|m| m.intercept.as_ref())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.model
            .as_ref()
            .ok_or(InfluenceError::ModelNotFitted)?
            .predict(&x.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn linear_problem() -> (Array2<f64>, Array2<f64>) {
        // y0 = 2 x0, y1 = -x0 + 0.5 x1, x2 irrelevant
        let x = array![
            [0.0, 1.0, 0.3],
            [1.0, 0.0, -0.2],
            [2.0, 1.0, 0.1],
            [3.0, 3.0, 0.4],
            [4.0, 1.0, -0.5],
            [5.0, 2.0, 0.0],
            [6.0, 0.0, 0.2],
            [7.0, 4.0, -0.1],
            [8.0, 2.0, 0.3],
            [9.0, 1.0, -0.3],
        ];
        let y = Array2::from_shape_fn((10, 2), |(i, t)| {
            if t == 0 {
                2.0 * x[[i, 0]]
            } else {
                -x[[i, 0]] + 0.5 * x[[i, 1]]
            }
        });
        (x, y)
    }

    #[test]
    fn test_small_alpha_recovers_coefficients() {
        let (x, y) = linear_problem();
        let mut model = MultiTaskLasso::new(1e-6).with_max_iter(10_000).with_tol(1e-10);
        model.fit(&x, &y).unwrap();

        let w = model.coefficients.as_ref().unwrap();
        assert!((w[[0, 0]] - 2.0).abs() < 1e-3);
        assert!((w[[0, 1]] + 1.0).abs() < 1e-3);
        assert!((w[[1, 1]] - 0.5).abs() < 1e-3);
        assert!(w[[2, 0]].abs() < 1e-3);

        let preds = model.predict(&x.view()).unwrap();
        let mse = (&preds - &y).mapv(|v| v * v).mean().unwrap();
        assert!(mse < 1e-4, "MSE too high: {}", mse);
    }

    #[test]
    fn test_large_alpha_zeroes_everything() {
        let (x, y) = linear_problem();
        let mut model = MultiTaskLasso::new(1e3);
        model.fit(&x, &y).unwrap();

        let w = model.coefficients.as_ref().unwrap();
        assert!(w.iter().all(|&v| v == 0.0));
        let b = model.intercept.as_ref().unwrap();
        assert!((b[0] - y.column(0).mean().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_group_sparsity_is_shared_across_tasks() {
        let (x, y) = linear_problem();
        let mut model = MultiTaskLasso::new(0.5);
        model.fit(&x, &y).unwrap();

        let w = model.coefficients.as_ref().unwrap();
        for row in w.rows() {
            let zeros = row.iter().filter(|&&v| v == 0.0).count();
            assert!(zeros == 0 || zeros == row.len(), "row {:?} is partially zero", row);
        }
    }

    #[test]
    fn test_invalid_alpha() {
        let (x, y) = linear_problem();
        let mut model = MultiTaskLasso::new(-1.0);
        assert!(matches!(model.fit(&x, &y), Err(InfluenceError::InvalidParameter { .. })));
    }

    #[test]
    fn test_logspace() {
        let grid = logspace(-4.0, 1.0, 20);
        assert_eq!(grid.len(), 20);
        assert!((grid[0] - 1e-4).abs() < 1e-16);
        assert!((grid[19] - 10.0).abs() < 1e-12);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_cv_selects_from_grid() {
        let (x, y) = linear_problem();
        let grid = vec![1e-3, 1e-2, 10.0];
        let mut cv = MultiTaskLassoCV::new(grid.clone()).with_cv(KFold::new(5));
        cv.fit(&x, &y).unwrap();

        let alpha = cv.alpha().unwrap();
        assert!(grid.contains(&alpha));
        assert!(alpha < 10.0, "an all-zero model should not win on noiseless data");
        assert_eq!(cv.searched_alphas(), &[10.0, 1e-2, 1e-3]);
        assert_eq!(cv.mse_path().unwrap().dim(), (3, 5));
        assert_eq!(cv.coefficients().unwrap().dim(), (3, 2));
    }

    #[test]
    fn test_cv_single_alpha_matches_fixed_fit() {
        let (x, y) = linear_problem();
        let mut cv = MultiTaskLassoCV::new(vec![0.05]);
        cv.fit(&x, &y).unwrap();

        let mut fixed = MultiTaskLasso::new(0.05);
        fixed.fit(&x, &y).unwrap();

        assert_eq!(cv.alpha(), Some(0.05));
        assert_eq!(cv.coefficients(), fixed.coefficients.as_ref());
    }

    #[test]
    fn test_cv_empty_grid() {
        let (x, y) = linear_problem();
        let mut cv = MultiTaskLassoCV::new(Vec::new());
        assert!(matches!(cv.fit(&x, &y), Err(InfluenceError::InvalidParameter { .. })));
    }

    #[test]
    fn test_cv_too_few_samples_for_folds() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![[1.0], [2.0], [3.0]];
        let mut cv = MultiTaskLassoCV::new(vec![0.1]);
        assert!(matches!(
            cv.fit(&x, &y),
            Err(InfluenceError::InsufficientSamples { required: 5, actual: 3 })
        ));
    }
}
