//! End-to-end checks of the Metropolis sampler on the reference 2D Gaussian run.

use mini_metropolis::config::RunConfig;
use mini_metropolis::core::{run_chain, MarkovChain};
use mini_metropolis::distributions::{density, Covariance2, NumericalError, Point};
use mini_metropolis::metropolis::{acceptance_ratio, Metropolis2D, StepOutcome};
use mini_metropolis::random::ScriptedSource;
use mini_metropolis::stats::ChainSummary;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn target() -> Covariance2 {
        Covariance2::from([[0.5, 0.2], [0.2, 0.5]])
    }

    fn proposal() -> Covariance2 {
        Covariance2::from([[0.25, 0.0], [0.0, 0.25]])
    }

    #[test]
    fn test_peak_density_of_reference_target() {
        let cov = target();
        assert_abs_diff_eq!(cov.determinant(), 0.21, epsilon = 1e-12);
        let peak = density(&cov, &Point::new(0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(peak, 0.3474, epsilon = 1e-4);
    }

    #[test]
    fn test_first_tick_seeds_from_uniform_draws() {
        // Any valid pair of covariances gives the same first tick.
        for (t, p) in [
            (target(), proposal()),
            (
                Covariance2::diagonal(3.0, 0.1),
                Covariance2::new(2.0, -0.5, -0.5, 1.0),
            ),
        ] {
            let rng = ScriptedSource::new(vec![0.3, 0.7], vec![]);
            let mut mh = Metropolis2D::with_source(t, p, rng).unwrap();
            let outcome = mh.step().unwrap();
            assert_eq!(outcome, StepOutcome::Seeded(Point::new(0.3, 0.7)));
            assert_eq!(mh.accepted(), &[Point::new(0.3, 0.7)]);
            assert!(mh.rejected().is_empty());
        }
    }

    #[test]
    fn test_identical_proposal_always_accepted() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(acceptance_ratio(&target(), &origin, &origin).unwrap(), 1.0);

        // Seed at the origin, propose the origin, and draw the largest u below one.
        let u = 1.0 - f64::EPSILON / 2.0;
        let rng = ScriptedSource::new(vec![0.0, 0.0, u], vec![0.0, 0.0]);
        let mut mh = Metropolis2D::with_source(target(), proposal(), rng).unwrap();
        mh.step().unwrap();
        let outcome = mh.step().unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Accepted {
                from: origin,
                to: origin,
                ratio: 1.0
            }
        );
        assert_eq!(mh.accepted(), &[origin, origin]);
    }

    #[test]
    fn test_singular_target_aborts_without_mutation() {
        let singular = Covariance2::from([[1.0, 1.0], [1.0, 1.0]]);
        let rng = ScriptedSource::new(vec![0.3, 0.7, 0.5], vec![1.0, 1.0]);
        let mut mh = Metropolis2D::with_source(singular, proposal(), rng).unwrap();

        // Seeding does not touch the density.
        mh.step().unwrap();
        let accepted_before = mh.accepted().to_vec();

        let err = mh.step().unwrap_err();
        assert_eq!(err, NumericalError::Singular { det: 0.0 });
        assert_eq!(mh.accepted(), accepted_before.as_slice());
        assert!(mh.rejected().is_empty());
        assert_eq!(mh.ticks(), 1);
    }

    #[test]
    fn test_counts_invariant_over_many_seeds() {
        for seed in 0..20u64 {
            let config = RunConfig::default()
                .set_seed(seed)
                .set_ticks(1 + seed as usize * 7);
            let mut mh = config.build().unwrap();
            let outcomes = run_chain(&mut mh, config.ticks).unwrap();
            assert_eq!(outcomes.len(), config.ticks);
            assert_eq!(mh.accepted().len() + mh.rejected().len(), config.ticks);
            assert!(!mh.accepted().is_empty());
            for outcome in &outcomes {
                match outcome {
                    StepOutcome::Accepted { ratio, .. } | StepOutcome::Rejected { ratio, .. } => {
                        assert!((0.0..=1.0).contains(ratio))
                    }
                    StepOutcome::Seeded(_) => {}
                }
            }
        }
    }

    #[test]
    fn test_rejections_pair_current_and_proposed() {
        let config = RunConfig::default().set_seed(42).set_ticks(2_000);
        let mut mh = config.build().unwrap();
        let outcomes = run_chain(&mut mh, config.ticks).unwrap();

        let mut current = None;
        let mut rejections = mh.rejected().iter();
        for outcome in outcomes {
            match outcome {
                StepOutcome::Seeded(p) => current = Some(p),
                StepOutcome::Accepted { from, to, .. } => {
                    assert_eq!(Some(from), current);
                    current = Some(to);
                }
                StepOutcome::Rejected { from, proposed, .. } => {
                    let logged = rejections.next().unwrap();
                    assert_eq!(logged.current, from);
                    assert_eq!(logged.proposed, proposed);
                    assert_eq!(Some(from), current);
                }
            }
        }
        assert!(rejections.next().is_none());
        assert_eq!(mh.current_state(), current);
    }

    #[test]
    fn test_same_seed_bit_identical_traces() {
        let config = RunConfig::default().set_seed(7).set_ticks(5_000);
        let run = || {
            let mut mh = config.build().unwrap();
            run_chain(&mut mh, config.ticks).unwrap();
            mh.into_trace()
        };
        let (acc_a, rej_a) = run();
        let (acc_b, rej_b) = run();

        let bits = |p: &Point| (p.x.to_bits(), p.y.to_bits());
        assert_eq!(
            acc_a.iter().map(bits).collect::<Vec<_>>(),
            acc_b.iter().map(bits).collect::<Vec<_>>()
        );
        assert_eq!(rej_a, rej_b);
    }

    #[test]
    fn test_accepted_points_centred_at_origin() {
        let config = RunConfig::default().set_seed(42).set_ticks(20_000);
        let mut mh = config.build().unwrap();
        run_chain(&mut mh, config.ticks).unwrap();

        let summary = ChainSummary::from_trace(mh.accepted(), mh.rejected());
        let mean = summary.mean.unwrap();
        assert!(
            mean.x.abs() < 0.1 && mean.y.abs() < 0.1,
            "Mean of accepted points too far from origin: {mean:?}"
        );
        assert!(summary.acceptance_rate > 0.0 && summary.acceptance_rate < 1.0);
    }
}
