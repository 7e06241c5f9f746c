//! Analysis configuration

use crate::error::{InfluenceError, Result};
use crate::training::{logspace, KFold, MaxFeatures, MultiTaskLassoCV, RandomForest};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for the per-output random forest fits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Trees per forest
    pub n_estimators: usize,
    /// Seed shared by every per-output forest
    pub random_state: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            random_state: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Unfitted forest with these settings
    pub fn build(&self) -> RandomForest {
        let mut forest = RandomForest::new(self.n_estimators)
            .with_random_state(self.random_state)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features)
            .with_bootstrap(self.bootstrap);
        if let Some(d) = self.max_depth {
            forest = forest.with_max_depth(d);
        }
        forest
    }
}

/// Settings for the joint multi-task Lasso fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparseJointConfig {
    /// Candidate regularization strengths
    pub alphas: Vec<f64>,
    /// Cross-validation folds
    pub cv_folds: usize,
    /// Shuffle samples before cutting folds
    pub shuffle: bool,
    /// Seed for fold shuffling
    pub random_state: u64,
    /// Coordinate-descent sweep limit
    pub max_iter: usize,
    /// Coordinate-descent tolerance
    pub tol: f64,
}

impl Default for SparseJointConfig {
    fn default() -> Self {
        Self {
            alphas: logspace(-4.0, 1.0, 20),
            cv_folds: 5,
            shuffle: false,
            random_state: 42,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl SparseJointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alphas(mut self, alphas: Vec<f64>) -> Self {
        self.alphas = alphas;
        self
    }

    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Unfitted cross-validated estimator with these settings
    pub fn build(&self) -> MultiTaskLassoCV {
        let cv = KFold::new(self.cv_folds)
            .with_shuffle(self.shuffle)
            .with_random_state(self.random_state);
        MultiTaskLassoCV::new(self.alphas.clone())
            .with_cv(cv)
            .with_max_iter(self.max_iter)
            .with_tol(self.tol)
    }
}

/// Settings for dependency summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Entries kept per output
    pub top_k: usize,
    /// Entries with |score| below this are dropped before truncation
    pub threshold: f64,
    /// Also print the summary to stdout
    pub pretty_print: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold: 1e-3,
            pretty_print: true,
        }
    }
}

impl SummaryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }
}

/// All analysis settings, as read from a JSON config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub forest: ForestConfig,
    pub sparse_joint: SparseJointConfig,
    pub summary: SummaryConfig,
}

impl AnalysisConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            InfluenceError::SerializationError(format!("invalid analysis config: {}", e))
        })
    }
}
