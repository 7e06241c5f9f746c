//! Data preprocessing module
//!
//! Column standardization applied independently to the design matrix and the
//! output matrix before any regression view is fitted.

mod scaler;

pub use scaler::{ScalerParams, StandardScaler};
