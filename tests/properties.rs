//! Invariants of the interval pipeline over random inputs

use proptest::prelude::*;
use robust_ebci::prelude::*;

fn observations() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..8).prop_flat_map(|n| {
        (
            prop::collection::vec(-10.0f64..10.0, n),
            prop::collection::vec(0.1f64..3.0, n),
        )
    })
}

fn modes() -> impl Strategy<Value = EbciOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 0usize..3).prop_map(
        |(parametric, tstat, length_optimal, correction)| {
            let mut options = EbciOptions::default().with_correction(
                [FsCorrection::None, FsCorrection::Pmt, FsCorrection::Fplib][correction],
            );
            if parametric {
                options = options.parametric();
            }
            if tstat {
                options = options.tstat_shrinkage();
            }
            if length_optimal {
                options = options.length_optimal();
            }
            options
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_intervals_are_symmetric_and_weights_bounded(
        (y, sigma) in observations(),
        options in modes(),
        alpha in 0.01f64..0.3,
    ) {
        let obs = Observations::new(y, sigma).unwrap();
        let result = compute(&obs, alpha, &options).unwrap();

        prop_assert_eq!(result.len(), obs.len());
        for i in 0..result.len() {
            let ci = &result.ci[i];
            let theta = result.thetahat[i];
            prop_assert!(ci.lower <= theta && theta <= ci.upper);
            let (below, above) = (theta - ci.lower, ci.upper - theta);
            prop_assert!((below - above).abs() <= 1e-9 * (1.0 + theta.abs()));
            prop_assert!((0.0..=1.0).contains(&result.w_estim[i]));
            prop_assert!(result.normlng[i] >= 0.0);
        }
    }

    #[test]
    fn prop_robust_at_least_parametric(
        (y, sigma) in observations(),
        alpha in 0.01f64..0.3,
        bounded in any::<bool>(),
    ) {
        let obs = Observations::new(y, sigma).unwrap();
        let options = if bounded {
            EbciOptions::default().with_kappa(3.0)
        } else {
            EbciOptions::default().without_kappa_bound()
        };
        let robust = compute(&obs, alpha, &options).unwrap();
        let parametric = compute(&obs, alpha, &options.clone().parametric()).unwrap();

        for i in 0..obs.len() {
            prop_assert!(robust.normlng[i] + 1e-9 >= parametric.normlng[i]);
            prop_assert_eq!(robust.w_estim[i], parametric.w_estim[i]);
        }
    }

    #[test]
    fn prop_length_optimal_not_longer(
        (y, sigma) in observations(),
        tstat in any::<bool>(),
    ) {
        let obs = Observations::new(y, sigma).unwrap();
        let mut options = EbciOptions::default();
        if tstat {
            options = options.tstat_shrinkage();
        }
        let mse = compute(&obs, 0.05, &options).unwrap();
        let short = compute(&obs, 0.05, &options.clone().length_optimal()).unwrap();

        for i in 0..obs.len() {
            prop_assert!(short.normlng[i] <= mse.normlng[i] + 1e-10);
        }
    }
}
