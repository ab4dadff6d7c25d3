// Strategy level tests: objective construction, turnover paths and solve modes

#[cfg(test)]
mod tests {
    use crate::*;
    use folioqp_constraints::{BoxType, ConstraintSense, Constraints};
    use folioqp_solver::{ClarabelSolver, QpModel, QpSolution, QpStatus, SolverBackend, VarMeta};
    use folioqp_types::{AssetId, FolioQpError, OptimizationData, ReturnSeries, ScoreTable, Weights};
    use nalgebra::{DMatrix, DVector};
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn ids() -> Vec<AssetId> {
        AssetId::list(&["A", "B", "C"])
    }

    /// Orthogonal columns scaled so the sample covariance is the identity
    fn identity_returns() -> ReturnSeries {
        let c = 3f64.sqrt() / 2.0;
        ReturnSeries::from_row_slice(
            ids(),
            4,
            &[
                c, c, c, //
                c, -c, -c, //
                -c, c, -c, //
                -c, -c, c,
            ],
        )
        .unwrap()
    }

    fn budget_only() -> Constraints {
        let mut constraints = Constraints::new(ids());
        constraints.add_budget(1.0, ConstraintSense::Eq);
        constraints
    }

    fn long_only_budget() -> Constraints {
        let mut constraints = budget_only();
        constraints.add_box(BoxType::LongOnly, None, None).unwrap();
        constraints
    }

    fn equal_weights() -> Weights {
        ids().into_iter().map(|id| (id, 1.0 / 3.0)).collect()
    }

    /// Forwards to Clarabel and keeps every model it was given
    struct RecordingBackend {
        inner: ClarabelSolver,
        models: Mutex<Vec<QpModel>>,
    }

    impl RecordingBackend {
        fn new() -> Arc<Self> {
            Arc::new(RecordingBackend {
                inner: ClarabelSolver::new(),
                models: Mutex::new(Vec::new()),
            })
        }

        fn last_model(&self) -> QpModel {
            self.models.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl SolverBackend for RecordingBackend {
        fn solve_qp(&self, model: &QpModel) -> folioqp_types::Result<QpSolution> {
            self.models.lock().unwrap().push(model.clone());
            self.inner.solve_qp(model)
        }
    }

    #[test]
    fn test_min_variance_objective() {
        let mut mv = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            budget_only(),
        )
        .unwrap();
        let objective = mv.set_objective(&OptimizationData::new(identity_returns())).unwrap();

        let p = objective.p().unwrap();
        assert!((p - DMatrix::<f64>::identity(3, 3) * 2.0).amax() < 1e-12);
        assert!(objective.q().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_min_variance_general_and_analytical() {
        init_tracing();
        let data = OptimizationData::new(identity_returns());

        let mut general = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            budget_only(),
        )
        .unwrap();
        general.set_objective(&data).unwrap();
        let general_results = general.solve().unwrap().clone();

        let params = OptimizationParams {
            solve_method: SolveMethod::AnalyticalEquality,
            ..Default::default()
        };
        let mut analytical =
            MinVariance::new(params, MinVarianceConfig::default(), budget_only()).unwrap();
        analytical.set_objective(&data).unwrap();
        let analytical_results = analytical.solve().unwrap();

        assert!(general_results.status);
        assert!(analytical_results.status);
        for id in ids() {
            assert!((general_results.weights[&id] - 1.0 / 3.0).abs() < 1e-6);
            assert!((analytical_results.weights[&id] - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_analytical_rejects_inequalities() {
        let params = OptimizationParams {
            solve_method: SolveMethod::AnalyticalEquality,
            ..Default::default()
        };
        let data = OptimizationData::new(identity_returns());

        let mut constraints = budget_only();
        constraints
            .add_group(&AssetId::list(&["A", "B"]), ConstraintSense::Le, 0.5)
            .unwrap();
        let mut mv = MinVariance::new(params.clone(), MinVarianceConfig::default(), constraints).unwrap();
        mv.set_objective(&data).unwrap();
        assert!(matches!(mv.solve(), Err(FolioQpError::UnsupportedConstraint(_))));

        let mut boxed =
            MinVariance::new(params.clone(), MinVarianceConfig::default(), long_only_budget()).unwrap();
        boxed.set_objective(&data).unwrap();
        assert!(matches!(boxed.solve(), Err(FolioQpError::UnsupportedConstraint(_))));

        let mut unconstrained = MinVariance::new(
            params,
            MinVarianceConfig::default(),
            Constraints::new(ids()),
        )
        .unwrap();
        unconstrained.set_objective(&data).unwrap();
        assert!(matches!(
            unconstrained.solve(),
            Err(FolioQpError::UnsupportedConstraint(_))
        ));
    }

    #[test]
    fn test_analytical_accepts_unbounded_box() {
        let params = OptimizationParams {
            solve_method: SolveMethod::AnalyticalEquality,
            ..Default::default()
        };
        let mut constraints = budget_only();
        constraints.add_box(BoxType::Unbounded, None, None).unwrap();

        let mut mv = MinVariance::new(params, MinVarianceConfig::default(), constraints).unwrap();
        mv.set_objective(&OptimizationData::new(identity_returns())).unwrap();
        let results = mv.solve().unwrap();
        assert!(results.status);
        for id in ids() {
            assert!((results.weights[&id] - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_indefinite_objective_rejected() {
        // eigenvalues 3 and -1 on the first two assets
        let p = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let coefficients = Objective::quadratic(p, DVector::zeros(3)).coefficients().clone();

        let mut general = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            budget_only(),
        )
        .unwrap();
        general.core_mut().set_objective_coefficients(coefficients.clone());
        assert!(matches!(general.solve(), Err(FolioQpError::Numerical(_))));

        let params = OptimizationParams {
            solve_method: SolveMethod::AnalyticalEquality,
            ..Default::default()
        };
        let mut analytical =
            MinVariance::new(params, MinVarianceConfig::default(), budget_only()).unwrap();
        analytical.core_mut().set_objective_coefficients(coefficients);
        assert!(matches!(analytical.solve(), Err(FolioQpError::Numerical(_))));
    }

    /// Returns fewer values than there are variables
    struct ShortBackend;

    impl SolverBackend for ShortBackend {
        fn solve_qp(&self, _model: &QpModel) -> folioqp_types::Result<QpSolution> {
            Ok(QpSolution {
                x: vec![0.5],
                status: QpStatus::Optimal,
                objective: 0.0,
                iterations: 1,
            })
        }
    }

    #[test]
    fn test_short_solution_is_solver_error() {
        let mut mv = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            budget_only(),
        )
        .unwrap()
        .with_backend(Arc::new(ShortBackend));
        mv.set_objective(&OptimizationData::new(identity_returns())).unwrap();
        assert!(matches!(mv.solve(), Err(FolioQpError::SolverError(_))));
        assert!(mv.results().is_none());
    }

    #[test]
    fn test_analytical_only_for_min_variance() {
        let params = OptimizationParams {
            solve_method: SolveMethod::AnalyticalEquality,
            ..Default::default()
        };
        let result = MeanVariance::new(params.clone(), MeanVarianceConfig::default(), budget_only());
        assert!(matches!(result, Err(FolioQpError::ConfigError(_))));

        let config = StrategyConfig::ScoreVariance(StrategySpec {
            params,
            config: ScoreVarianceConfig::default(),
        });
        assert!(config.build(budget_only()).is_err());
    }

    #[test]
    fn test_solve_without_objective() {
        let mut mv = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            budget_only(),
        )
        .unwrap();
        assert!(matches!(mv.solve(), Err(FolioQpError::MissingCoefficient(_))));
    }

    #[test]
    fn test_objective_dimension_checked() {
        let mut mv = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            Constraints::new(AssetId::list(&["A", "B"])),
        )
        .unwrap();
        assert!(matches!(
            mv.set_objective(&OptimizationData::new(identity_returns())),
            Err(FolioQpError::Dimension(_))
        ));

        let coefficients = Objective::quadratic(DMatrix::identity(3, 3), DVector::zeros(3))
            .coefficients()
            .clone();
        mv.core_mut().set_objective_coefficients(coefficients);
        assert!(matches!(mv.solve(), Err(FolioQpError::Dimension(_))));
    }

    #[test]
    fn test_asset_order_must_match_constraints() {
        // Y is volatile, X is nearly flat
        let series = ReturnSeries::from_row_slice(
            AssetId::list(&["Y", "X"]),
            4,
            &[
                0.5, 0.01, //
                -0.4, -0.01, //
                0.3, 0.01, //
                -0.2, -0.01,
            ],
        )
        .unwrap();
        let data = OptimizationData::new(series);

        let mut reversed = Constraints::new(AssetId::list(&["X", "Y"]));
        reversed.add_budget(1.0, ConstraintSense::Eq);
        let mut mv = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            reversed,
        )
        .unwrap();
        assert!(matches!(mv.set_objective(&data), Err(FolioQpError::Dimension(_))));
        assert!(mv.objective().get("P").is_none());

        let mut aligned = Constraints::new(AssetId::list(&["Y", "X"]));
        aligned.add_budget(1.0, ConstraintSense::Eq);
        mv.core_mut().set_constraints(aligned).unwrap();
        mv.set_objective(&data).unwrap();
        let results = mv.solve().unwrap();
        assert!(results.status);
        assert!(results.weights[&AssetId::new("X")] > 0.9, "{:?}", results.weights);
    }

    #[test]
    fn test_mean_variance_objective() {
        let config = MeanVarianceConfig {
            risk_aversion: 3.0,
            ..Default::default()
        };
        let mut mv = MeanVariance::new(OptimizationParams::default(), config, budget_only()).unwrap();
        let data = OptimizationData::new(identity_returns());
        let objective = mv.set_objective(&data).unwrap().clone();

        let mu = geometric_mean(&identity_returns());
        assert!((objective.p().unwrap() - DMatrix::<f64>::identity(3, 3) * 6.0).amax() < 1e-12);
        assert!((objective.q().unwrap() + mu).amax() < 1e-12);
    }

    /// Per-column geometric mean, computed independently of the estimator
    fn geometric_mean(x: &ReturnSeries) -> DVector<f64> {
        let t = x.num_periods() as f64;
        DVector::from_iterator(
            x.num_assets(),
            x.values()
                .column_iter()
                .map(|col| col.iter().map(|r| 1.0 + r).product::<f64>().powf(1.0 / t) - 1.0),
        )
    }

    fn tracking_data(beta: &[f64]) -> OptimizationData {
        let x = DMatrix::from_row_slice(
            6,
            3,
            &[
                0.10, 0.20, -0.10, //
                0.30, -0.10, 0.00, //
                -0.20, 0.10, 0.20, //
                0.00, 0.30, 0.10, //
                0.10, -0.20, 0.30, //
                0.20, 0.00, -0.20,
            ],
        );
        let y = &x * DVector::from_column_slice(beta);
        let series = ReturnSeries::new(ids(), x).unwrap();
        OptimizationData::new(series)
            .with_benchmark(y.iter().copied().collect())
            .unwrap()
    }

    #[test]
    fn test_least_squares_objective() {
        let data = tracking_data(&[0.5, 0.3, 0.2]);
        let mut ls = LeastSquares::new(
            OptimizationParams::default(),
            LeastSquaresConfig::default(),
            budget_only(),
        )
        .unwrap();
        let objective = ls.set_objective(&data).unwrap();

        let x = data.return_series.values();
        let y = data.bm_series.as_ref().unwrap();
        assert!((objective.p().unwrap() - x.transpose() * x * 2.0).amax() < 1e-12);
        assert!((objective.q().unwrap() + x.transpose() * y * 2.0).amax() < 1e-12);
        assert!((objective.constant().unwrap() - y.dot(y)).abs() < 1e-12);
    }

    #[test]
    fn test_least_squares_recovers_benchmark() {
        let beta = [0.5, 0.3, 0.2];
        let mut ls = LeastSquares::new(
            OptimizationParams::default(),
            LeastSquaresConfig::default(),
            long_only_budget(),
        )
        .unwrap();
        ls.set_objective(&tracking_data(&beta)).unwrap();
        let results = ls.solve().unwrap();

        assert!(results.status);
        for (id, b) in ids().iter().zip(beta.iter()) {
            assert!((results.weights[id] - b).abs() < 1e-3, "{:?}", results.weights);
        }
    }

    #[test]
    fn test_least_squares_ridge_matches_closed_form() {
        let data = tracking_data(&[0.5, 0.3, 0.2]);
        let lambda = 0.05;
        let config = LeastSquaresConfig {
            log_transform: false,
            l2_penalty: lambda,
        };
        let mut ridge =
            LeastSquares::new(OptimizationParams::default(), config, Constraints::new(ids())).unwrap();
        ridge.set_objective(&data).unwrap();
        let weights = ridge.solve().unwrap().to_vector(&ids());

        let x = data.return_series.values();
        let y = data.bm_series.as_ref().unwrap();
        let gram = x.transpose() * x + DMatrix::<f64>::identity(3, 3) * lambda;
        let expected = gram.try_inverse().unwrap() * x.transpose() * y;
        assert!((&weights - &expected).amax() < 1e-10);
        // shrinks towards zero relative to the exact fit
        assert!(weights.norm() < DVector::from_vec(vec![0.5, 0.3, 0.2]).norm());
    }

    #[test]
    fn test_least_squares_unconstrained_fewer_periods_than_assets() {
        let series = ReturnSeries::from_row_slice(
            ids(),
            2,
            &[
                0.10, 0.20, -0.10, //
                0.30, -0.10, 0.00,
            ],
        )
        .unwrap();
        let data = OptimizationData::new(series)
            .with_benchmark(vec![0.05, 0.10])
            .unwrap();
        let mut ls = LeastSquares::new(
            OptimizationParams::default(),
            LeastSquaresConfig::default(),
            Constraints::new(ids()),
        )
        .unwrap();
        ls.set_objective(&data).unwrap();
        let weights = ls.solve().unwrap().clone();

        // singular normal equations, but the benchmark is still tracked exactly
        assert!(weights.status);
        let fitted = data.return_series.values() * weights.to_vector(&ids());
        assert!((fitted - data.bm_series.as_ref().unwrap()).amax() < 1e-8);
    }

    #[test]
    fn test_least_squares_requires_benchmark() {
        let mut ls = LeastSquares::new(
            OptimizationParams::default(),
            LeastSquaresConfig::default(),
            budget_only(),
        )
        .unwrap();
        let result = ls.set_objective(&OptimizationData::new(identity_returns()));
        assert!(matches!(result, Err(FolioQpError::ConfigError(_))));
    }

    fn scored_data() -> OptimizationData {
        let scores = ScoreTable::new(ids())
            .with_field("momentum", vec![0.1, 0.2, -0.05])
            .unwrap()
            .with_field("value", vec![-0.1, 0.0, 0.1])
            .unwrap();
        OptimizationData::new(identity_returns())
            .with_scores(scores)
            .unwrap()
            .with_cap_weights(vec![0.5, 0.3, 0.2])
            .unwrap()
    }

    #[test]
    fn test_score_variance_objective() {
        let config = ScoreVarianceConfig {
            field: Some("momentum".to_string()),
            risk_aversion: 0.0,
            ..Default::default()
        };
        let mut sv = ScoreVariance::new(OptimizationParams::default(), config, long_only_budget()).unwrap();
        let objective = sv.set_objective(&scored_data()).unwrap();

        assert_eq!(objective.p().unwrap(), DMatrix::<f64>::zeros(3, 3));
        assert_eq!(objective.q().unwrap().as_slice(), &[-0.1, -0.2, 0.05]);
    }

    #[test]
    fn test_score_variance_field_errors() {
        let mut missing = ScoreVariance::new(
            OptimizationParams::default(),
            ScoreVarianceConfig::default(),
            long_only_budget(),
        )
        .unwrap();
        match missing.set_objective(&scored_data()) {
            Err(FolioQpError::ConfigError(msg)) => assert!(msg.contains("Field must be specified")),
            other => panic!("unexpected result: {:?}", other.map(|o| o.clone())),
        }

        let config = ScoreVarianceConfig {
            field: Some("quality".to_string()),
            ..Default::default()
        };
        let mut unknown = ScoreVariance::new(OptimizationParams::default(), config, long_only_budget()).unwrap();
        assert!(matches!(
            unknown.set_objective(&scored_data()),
            Err(FolioQpError::ConfigError(_))
        ));
    }

    #[test]
    fn test_black_litterman_posterior_two_fields() {
        let config = BlackLittermanConfig {
            fields: vec!["momentum".to_string(), "value".to_string()],
            scalefactor: 0.5,
            ..Default::default()
        };
        let mut bl = BlackLitterman::new(OptimizationParams::default(), config, long_only_budget()).unwrap();
        let objective = bl.set_objective(&scored_data()).unwrap().clone();

        // Sigma = I, Psi = I, Omega = I: posterior = (w + q1 + q2) / 3
        let w = DVector::from_vec(vec![0.5, 0.3, 0.2]);
        let q1 = &w + DVector::from_vec(vec![0.1, 0.2, -0.05]) * 0.5;
        let q2 = &w + DVector::from_vec(vec![-0.1, 0.0, 0.1]) * 0.5;
        let expected = (&w + q1 + q2) / 3.0;

        let posterior = bl.posterior().unwrap();
        assert!((posterior - &expected).amax() < 1e-10);
        assert!((objective.q().unwrap() + &expected).amax() < 1e-10);
        assert!((objective.p().unwrap() - DMatrix::<f64>::identity(3, 3) * 2.0).amax() < 1e-10);
        assert!(bl.covariance().matrix.is_some());
    }

    #[test]
    fn test_black_litterman_requires_inputs() {
        let config = BlackLittermanConfig {
            fields: vec!["momentum".to_string()],
            ..Default::default()
        };
        let mut bl = BlackLitterman::new(OptimizationParams::default(), config, long_only_budget()).unwrap();

        let no_caps = OptimizationData::new(identity_returns());
        assert!(matches!(bl.set_objective(&no_caps), Err(FolioQpError::ConfigError(_))));

        let no_scores = OptimizationData::new(identity_returns())
            .with_cap_weights(vec![0.4, 0.4, 0.2])
            .unwrap();
        assert!(matches!(bl.set_objective(&no_scores), Err(FolioQpError::ConfigError(_))));
    }

    #[test]
    fn test_turnover_constraint_wins_over_penalty() {
        init_tracing();
        let mut constraints = long_only_budget();
        constraints.add_l1_turnover(equal_weights(), 0.2).unwrap();
        let params = OptimizationParams {
            turnover_penalty: Some(0.5),
            x_init: Some(equal_weights()),
            ..Default::default()
        };
        let backend = RecordingBackend::new();
        let mut mv = MinVariance::new(params, MinVarianceConfig::default(), constraints)
            .unwrap()
            .with_backend(backend.clone());
        mv.set_objective(&OptimizationData::new(identity_returns())).unwrap();
        mv.solve().unwrap();

        let model = backend.last_model();
        assert_eq!(model.num_vars(), 6);
        assert_eq!(model.var_meta[4], VarMeta::TurnoverSlack(1));
        // slack costs stay zero: no penalty applied
        assert!(model.q.rows(3, 3).iter().all(|&v| v == 0.0));
        // budget row over the slacks is present
        let budget_row = (0..model.num_constraints()).find(|&i| {
            (0..3).all(|j| model.a[(i, j)] == 0.0) && (3..6).all(|j| model.a[(i, j)] == 1.0)
        });
        let row = budget_row.expect("turnover budget row");
        assert_eq!(model.u[row], 0.2);
    }

    #[test]
    fn test_turnover_penalty_path() {
        let params = OptimizationParams {
            turnover_penalty: Some(0.5),
            x_init: Some(equal_weights()),
            ..Default::default()
        };
        let backend = RecordingBackend::new();
        let mut mv = MinVariance::new(params, MinVarianceConfig::default(), long_only_budget())
            .unwrap()
            .with_backend(backend.clone());
        mv.set_objective(&OptimizationData::new(identity_returns())).unwrap();
        let results = mv.solve().unwrap().clone();

        let model = backend.last_model();
        assert!(model.q.rows(3, 3).iter().all(|&v| v == 0.5));
        // starting at the minimum variance point, no trade is needed
        assert!(results.status);
        assert_eq!(results.weights.len(), 3);
        for id in ids() {
            assert!((results.weights[&id] - 1.0 / 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_turnover_penalty_requires_x_init() {
        let params = OptimizationParams {
            turnover_penalty: Some(0.5),
            ..Default::default()
        };
        let result = MinVariance::new(params, MinVarianceConfig::default(), long_only_budget());
        assert!(matches!(result, Err(FolioQpError::ConfigError(_))));
    }

    #[test]
    fn test_results_overwritten() {
        let mut infeasible = long_only_budget();
        infeasible.add_box(BoxType::LongOnly, Some(0.0), Some(0.2)).unwrap();

        let mut mv = MinVariance::new(
            OptimizationParams::default(),
            MinVarianceConfig::default(),
            infeasible,
        )
        .unwrap();
        mv.set_objective(&OptimizationData::new(identity_returns())).unwrap();
        assert!(!mv.solve().unwrap().status);

        mv.core_mut().set_constraints(long_only_budget()).unwrap();
        let results = mv.solve().unwrap().clone();
        assert!(results.status);
        assert_eq!(mv.results(), Some(&results));
        assert!((results.total_weight() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_strategy_enum_dispatch() {
        let config = StrategyConfig::from_json(
            r#"{"strategy": "min_variance", "params": {"solve_method": "analytical_equality"}}"#,
        )
        .unwrap();
        let mut strategy = config.build(budget_only()).unwrap();
        assert_eq!(strategy.name(), "min_variance");

        strategy.set_objective(&OptimizationData::new(identity_returns())).unwrap();
        let results = strategy.solve().unwrap();
        assert!(results.status);
        assert!((results.total_weight() - 1.0).abs() < 1e-12);
    }

    fn positive_definite(entries: &[f64]) -> DMatrix<f64> {
        let l = DMatrix::from_row_slice(3, 3, entries);
        (&l * l.transpose() + DMatrix::<f64>::identity(3, 3) * 0.5) * 2.0
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_analytical_matches_general(entries in proptest::collection::vec(-1.0f64..1.0, 9)) {
            let p = positive_definite(&entries);
            let coefficients = Objective::quadratic(p, DVector::zeros(3)).coefficients().clone();

            let mut constraints = budget_only();
            constraints
                .add_linear([(AssetId::new("A"), 1.0), (AssetId::new("C"), -1.0)].into_iter().collect(), ConstraintSense::Eq, 0.1)
                .unwrap();

            let mut general = MinVariance::new(
                OptimizationParams::default(),
                MinVarianceConfig::default(),
                constraints.clone(),
            )
            .unwrap();
            general.core_mut().set_objective_coefficients(coefficients.clone());
            let x_general = general.solve().unwrap().to_vector(&ids());

            let params = OptimizationParams {
                solve_method: SolveMethod::AnalyticalEquality,
                ..Default::default()
            };
            let mut analytical =
                MinVariance::new(params, MinVarianceConfig::default(), constraints.clone()).unwrap();
            analytical.core_mut().set_objective_coefficients(coefficients);
            let x_analytical = analytical.solve().unwrap().to_vector(&ids());

            let form = constraints.to_matrix_form();
            let (a, b) = (form.a.unwrap(), form.b.unwrap());
            prop_assert!((&a * &x_analytical - &b).amax() < 1e-9);
            prop_assert!((&x_general - &x_analytical).amax() < 1e-4);
        }
    }
}
