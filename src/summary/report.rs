//! Plain-text top-influencer listing

use super::ranking::rank_by_magnitude;
use crate::analysis::{CoefficientResult, ImportanceResult, InfluenceScores};
use crate::error::{InfluenceError, Result};
use std::io::Write;

fn direction(coef: f64) -> &'static str {
    if coef > 0.0 {
        "↑"
    } else if coef < 0.0 {
        "↓"
    } else {
        "-"
    }
}

fn write_section<W, S, F>(writer: &mut W, title: &str, result: &S, top_k: usize, line: F) -> Result<()>
where
    W: Write,
    S: InfluenceScores,
    F: Fn(&str, f64) -> String,
{
    writeln!(writer, "\n=== {} ===", title)?;
    for (h, output) in result.output_labels().iter().enumerate() {
        let column = result.scores().column(h);
        writeln!(writer, "\n- {}:", output)?;
        for d in rank_by_magnitude(column).into_iter().take(top_k) {
            writeln!(writer, "    • {}", line(&result.design_labels()[d], column[d]))?;
        }
    }
    Ok(())
}

/// Write the top `top_k` design variables per output for each available
/// result. No threshold is applied. A missing result is skipped; both
/// missing is an error.
pub fn write_top_influencers<W: Write>(
    writer: &mut W,
    importances: Option<&ImportanceResult>,
    coefficients: Option<&CoefficientResult>,
    top_k: usize,
) -> Result<()> {
    if importances.is_none() && coefficients.is_none() {
        return Err(InfluenceError::NotComputed(
            "run the random forest or multi-task Lasso analysis first".to_string(),
        ));
    }

    if let Some(result) = importances {
        write_section(
            writer,
            "Top Influencers from Random Forest",
            result,
            top_k,
            |param, v| format!("{} → importance = {:.4}", param, v),
        )?;
    }
    if let Some(result) = coefficients {
        write_section(
            writer,
            "Top Influencers from Lasso (with direction)",
            result,
            top_k,
            |param, v| format!("{} → coef = {:.4} ({})", param, v, direction(v)),
        )?;
    }
    Ok(())
}
