//! Integration test: sensitivity analysis end-to-end

use design_influence::prelude::*;
use design_influence::training::MultiTaskLasso;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn labels(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
}

/// 100 samples, 3 design variables, 2 outputs. The second output is a strong
/// linear function of the first design variable.
fn linear_driver_data() -> (Array2<f64>, Array2<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let design = Array2::from_shape_fn((100, 3), |_| rng.gen_range(0.0..1.0));
    let mut outputs = Array2::zeros((100, 2));
    for i in 0..100 {
        let noise: f64 = rng.gen_range(-0.05..0.05);
        outputs[[i, 0]] = 1.5 * design[[i, 1]] - 0.8 * design[[i, 2]] + noise;
        outputs[[i, 1]] = 4.0 * design[[i, 0]] + 0.1 * noise;
    }
    (design, outputs)
}

fn analyzer() -> InfluenceAnalyzer {
    let (design, outputs) = linear_driver_data();
    InfluenceAnalyzer::new(design, outputs, labels("design_", 3), labels("h_", 2))
        .expect("valid observations")
}

fn quiet_summary(top_k: usize, threshold: f64) -> SummaryConfig {
    SummaryConfig::new()
        .with_top_k(top_k)
        .with_threshold(threshold)
        .with_pretty_print(false)
}

#[test]
fn test_linear_driver_ranked_first_in_both_views() {
    let mut a = analyzer();
    a.run_random_forest(&ForestConfig::default()).unwrap();
    a.run_multitask_lasso(&SparseJointConfig::default()).unwrap();

    let summary = a.dependency_summary(&quiet_summary(3, 1e-3)).unwrap();

    let rf = summary.random_forest.as_ref().unwrap();
    assert_eq!(rf.get("h_2").unwrap()[0].parameter, "design_1");

    let lasso = summary.lasso.as_ref().unwrap();
    let top = &lasso.get("h_2").unwrap()[0];
    assert_eq!(top.parameter, "design_1");
    assert!(top.coef > 0.0, "driver has a positive slope");

    // The first output does not depend on design_1
    assert_ne!(rf.get("h_1").unwrap()[0].parameter, "design_1");
}

#[test]
fn test_forest_is_reproducible() {
    let mut a = analyzer();
    let cfg = ForestConfig::new().with_n_estimators(40).with_random_state(42);
    let first = a.run_random_forest(&cfg).unwrap().matrix.clone();
    let second = a.run_random_forest(&cfg).unwrap().matrix.clone();
    assert_eq!(first, second);

    let mut b = analyzer();
    assert_eq!(b.run_random_forest(&cfg).unwrap().matrix, first);
}

#[test]
fn test_importances_sum_to_one_per_output() {
    let mut a = analyzer();
    let result = a
        .run_random_forest(&ForestConfig::new().with_n_estimators(30))
        .unwrap();
    assert_eq!(result.matrix.dim(), (3, 2));
    for column in result.matrix.columns() {
        assert!((column.sum() - 1.0).abs() < 1e-9);
        assert!(column.iter().all(|&v| v >= 0.0));
    }
}

#[test]
fn test_summary_bounds_and_order() {
    let mut a = analyzer();
    a.run_random_forest(&ForestConfig::new().with_n_estimators(30)).unwrap();
    a.run_multitask_lasso(&SparseJointConfig::default()).unwrap();

    for top_k in 0..=4 {
        let threshold = 0.05;
        let s = a.dependency_summary(&quiet_summary(top_k, threshold)).unwrap();

        for (_, entries) in s.random_forest.as_ref().unwrap().iter() {
            assert!(entries.len() <= top_k);
            assert!(entries.iter().all(|e| e.importance.abs() >= threshold));
            assert!(entries.windows(2).all(|w| w[0].importance.abs() >= w[1].importance.abs()));
        }
        for (_, entries) in s.lasso.as_ref().unwrap().iter() {
            assert!(entries.len() <= top_k);
            assert!(entries.iter().all(|e| e.coef.abs() >= threshold));
            assert!(entries.windows(2).all(|w| w[0].coef.abs() >= w[1].coef.abs()));
        }
    }
}

#[test]
fn test_huge_threshold_empties_every_list() {
    let mut a = analyzer();
    a.run_random_forest(&ForestConfig::new().with_n_estimators(20)).unwrap();
    a.run_multitask_lasso(&SparseJointConfig::default()).unwrap();

    let s = a.dependency_summary(&quiet_summary(3, 1e9)).unwrap();
    let rf = s.random_forest.as_ref().unwrap();
    let lasso = s.lasso.as_ref().unwrap();
    assert_eq!(rf.len(), 2);
    assert_eq!(lasso.len(), 2);
    assert!(rf.iter().all(|(_, entries)| entries.is_empty()));
    assert!(lasso.iter().all(|(_, entries)| entries.is_empty()));

    let value = s.to_json_value().unwrap();
    assert_eq!(value["random_forest"]["h_1"], serde_json::json!([]));
    assert_eq!(value["lasso"]["h_2"], serde_json::json!([]));
}

#[test]
fn test_nothing_computed() {
    let a = analyzer();
    assert!(matches!(
        a.dependency_summary(&quiet_summary(3, 1e-3)),
        Err(InfluenceError::NotComputed(_))
    ));
    assert!(matches!(
        a.write_dependency_report(&mut Vec::<u8>::new(), 3),
        Err(InfluenceError::NotComputed(_))
    ));
    assert!(matches!(a.heatmap(), Err(InfluenceError::NothingToDisplay)));
}

#[test]
fn test_single_alpha_grid_matches_fixed_alpha() {
    let mut a = analyzer();
    let alpha = 0.02;
    let result = a
        .run_multitask_lasso(&SparseJointConfig::new().with_alphas(vec![alpha]))
        .unwrap()
        .clone();
    assert_eq!(result.alpha, alpha);

    let std = a.standardized();
    let mut fixed = MultiTaskLasso::new(alpha);
    fixed.fit(&std.design, &std.outputs).unwrap();
    assert_eq!(fixed.coefficients.as_ref().unwrap(), &result.matrix);
}

#[test]
fn test_large_alpha_zeroes_whole_rows() {
    let mut a = analyzer();
    let result = a
        .run_multitask_lasso(&SparseJointConfig::new().with_alphas(vec![1e3]))
        .unwrap();
    assert!(result.matrix.iter().all(|&v| v == 0.0));
    assert_eq!(result.eliminated().len(), 3);
}

#[test]
fn test_lasso_search_metadata() {
    let mut a = analyzer();
    let result = a
        .run_multitask_lasso(&SparseJointConfig::default().with_cv_folds(4))
        .unwrap();
    assert_eq!(result.alphas.len(), 20);
    assert!(result.alphas.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(result.mse_path.dim(), (20, 4));
    assert!(result.alphas.contains(&result.alpha));
}

#[test]
fn test_row_count_mismatch() {
    let err = InfluenceAnalyzer::new(
        Array2::zeros((10, 3)),
        Array2::zeros((9, 2)),
        labels("d", 3),
        labels("h", 2),
    )
    .unwrap_err();
    assert!(matches!(err, InfluenceError::ShapeError { .. }));
}

#[test]
fn test_constant_column_rejected() {
    let (mut design, outputs) = linear_driver_data();
    design.column_mut(2).fill(0.7);
    let err = InfluenceAnalyzer::new(design, outputs, labels("design_", 3), labels("h_", 2))
        .unwrap_err();
    match err {
        InfluenceError::DegenerateColumn { matrix, column } => {
            assert_eq!(matrix, "design");
            assert_eq!(column, "design_3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_small_unit_design_accepted() {
    // Values on the order of 1e-15 (farads, square metres) with real spread
    let design = Array2::from_shape_fn((20, 2), |(i, j)| 1e-15 * ((i * (j + 3)) % 7) as f64);
    let outputs = Array2::from_shape_fn((20, 1), |(i, _)| 5.0 + 1e14 * design[[i, 0]]);
    let a = InfluenceAnalyzer::new(design, outputs, labels("c", 2), labels("h_", 1)).unwrap();
    assert_eq!(a.standardized().design.dim(), (20, 2));
}

#[test]
fn test_text_report_sections() {
    let mut a = analyzer();
    a.run_multitask_lasso(&SparseJointConfig::default()).unwrap();

    let mut out = Vec::new();
    a.write_dependency_report(&mut out, 2).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("=== Top Influencers from Lasso (with direction) ==="));
    assert!(!text.contains("Random Forest"));
    assert!(text.contains("- h_2:\n    • design_1 → coef = "));
    assert!(text.contains("(↑)"));
}

#[test]
fn test_heatmap_follows_presence() {
    let mut a = analyzer();
    a.run_random_forest(&ForestConfig::new().with_n_estimators(10)).unwrap();
    assert!(matches!(a.heatmap().unwrap(), HeatmapView::Importance(_)));

    a.run_multitask_lasso(&SparseJointConfig::default()).unwrap();
    let view = a.heatmap().unwrap();
    assert!(matches!(view, HeatmapView::Combined { .. }));

    let text = view.render_text(false);
    assert!(text.contains("Random Forest: Design Parameter Importance"));
    assert!(text.contains("Multi-Task Lasso: Design Influence"));
}
