//! Dependency summaries
//!
//! Reduces the result matrices to the few design variables that matter most
//! for each Hamiltonian parameter, as a serializable structure and as a
//! plain-text listing.

mod ranking;
mod report;

pub use ranking::{rank_by_magnitude, select_top};
pub use report::write_top_influencers;

use crate::analysis::{CoefficientResult, ImportanceResult, InfluenceScores};
use crate::error::{InfluenceError, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::io::Write;

/// One random forest entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceEntry {
    pub parameter: String,
    pub importance: f64,
}

/// One multi-task Lasso entry; the sign is kept
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientEntry {
    pub parameter: String,
    pub coef: f64,
}

/// Ranked entries keyed by output label. Serializes as a JSON object whose
/// keys follow output label order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRankings<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> OutputRankings<T> {
    pub fn get(&self, output: &str) -> Option<&[T]> {
        self.entries
            .iter()
            .find(|(label, _)| label == output)
            .map(|(_, list)| list.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(label, list)| (label.as_str(), list.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Serialize> Serialize for OutputRankings<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, list) in &self.entries {
            map.serialize_entry(label, list)?;
        }
        map.end()
    }
}

fn rank_outputs<S, T, F>(result: &S, top_k: usize, threshold: f64, entry: F) -> OutputRankings<T>
where
    S: InfluenceScores,
    F: Fn(String, f64) -> T,
{
    let scores = result.scores();
    let entries = result
        .output_labels()
        .iter()
        .enumerate()
        .map(|(h, label)| {
            let column = scores.column(h);
            let list = select_top(column, top_k, threshold)
                .into_iter()
                .map(|d| entry(result.design_labels()[d].clone(), column[d]))
                .collect();
            (label.clone(), list)
        })
        .collect();
    OutputRankings { entries }
}

/// Top-k influencers per output for each computed result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencySummary {
    #[serde(skip)]
    pub top_k: usize,
    #[serde(skip)]
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_forest: Option<OutputRankings<ImportanceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lasso: Option<OutputRankings<CoefficientEntry>>,
}

impl DependencySummary {
    /// Rank each available result by |score|, drop entries below
    /// `threshold`, and keep at most `top_k` per output.
    pub fn build(
        importances: Option<&ImportanceResult>,
        coefficients: Option<&CoefficientResult>,
        top_k: usize,
        threshold: f64,
    ) -> Result<Self> {
        if importances.is_none() && coefficients.is_none() {
            return Err(InfluenceError::NotComputed(
                "run the random forest or multi-task Lasso analysis first".to_string(),
            ));
        }
        if threshold.is_nan() {
            return Err(InfluenceError::InvalidParameter {
                name: "threshold".to_string(),
                value: "NaN".to_string(),
                reason: "must be a number".to_string(),
            });
        }

        Ok(Self {
            top_k,
            threshold,
            random_forest: importances.map(|r| {
                rank_outputs(r, top_k, threshold, |parameter, importance| ImportanceEntry {
                    parameter,
                    importance,
                })
            }),
            lasso: coefficients.map(|r| {
                rank_outputs(r, top_k, threshold, |parameter, coef| CoefficientEntry {
                    parameter,
                    coef,
                })
            }),
        })
    }

    /// Indented JSON with output keys in label order
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| InfluenceError::SerializationError(e.to_string()))
    }

    /// Compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// As a JSON value tree; object keys of a `Value` are sorted
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Header line followed by the indented JSON
    pub fn write_pretty<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(
            writer,
            "\n=== Dependency Summary (Top {} per Hamiltonian parameter, threshold={}) ===",
            self.top_k, self.threshold
        )?;
        writeln!(writer, "{}", self.to_json_pretty()?)?;
        Ok(())
    }
}
