//! Regression services
//!
//! The two regression views used by the analysis, plus what they need:
//! - Regression trees and Random Forests (impurity-based importances)
//! - Multi-task Lasso with a cross-validated shared alpha
//! - K-fold cross-validation

pub mod cross_validation;
pub mod decision_tree;
pub mod multitask_lasso;
pub mod random_forest;

pub use cross_validation::{CVResults, CVSplit, KFold};
pub use decision_tree::{DecisionTree, TreeNode};
pub use multitask_lasso::{logspace, MultiTaskLasso, MultiTaskLassoCV};
pub use random_forest::{MaxFeatures, RandomForest};
