//! Magnitude ranking of score columns

use ndarray::ArrayView1;

/// Indices ordered by descending |score|. The sort is stable, so equal
/// magnitudes keep label order.
pub fn rank_by_magnitude(scores: ArrayView1<'_, f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].abs().total_cmp(&scores[a].abs()));
    order
}

/// Drop entries with |score| below `threshold`, then keep the first `top_k`
/// of the ranked remainder.
pub fn select_top(scores: ArrayView1<'_, f64>, top_k: usize, threshold: f64) -> Vec<usize> {
    rank_by_magnitude(scores)
        .into_iter()
        .filter(|&i| scores[i].abs() >= threshold)
        .take(top_k)
        .collect()
}
