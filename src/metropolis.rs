/*!
# Metropolis Sampler

A single Metropolis chain on a zero-mean bivariate Gaussian target `N(0, Σ)` with an
independent zero-mean Gaussian proposal `N(0, Σ₂)`.

## Overview

- **Seeding**: the first tick draws a point from Uniform[0,1)² and accepts it without any
  density evaluation or acceptance test.
- **Ticks**: every later tick evaluates the target at the current state, draws a proposal
  from `N(0, Σ₂)` (not offset by the current state), computes
  `a = min(1, π(x') / π(x))`, and accepts when a uniform draw `u` satisfies `u ≤ a`.
- **Trace**: accepted points are appended to the accepted chain; rejected moves are
  appended to the rejected log as `(current, proposed)` pairs. A rejection does not repeat
  the current state, so every tick appends to exactly one of the two sequences.
- **Reproducibility**: all draws come from the sampler's [`RandomSource`]; two samplers
  with the same configuration and seed produce bit-identical traces.

## Example Usage

```rust
use mini_metropolis::core::{run_chain, MarkovChain};
use mini_metropolis::distributions::Covariance2;
use mini_metropolis::metropolis::Metropolis2D;

let target = Covariance2::new(0.5, 0.2, 0.2, 0.5);
let proposal = Covariance2::diagonal(0.25, 0.25);
let mut mh = Metropolis2D::new(target, proposal).unwrap().set_seed(42);

run_chain(&mut mh, 25).unwrap();
assert_eq!(mh.accepted().len() + mh.rejected().len(), 25);
```
*/

use log::debug;

pub use crate::core::StepOutcome;

use crate::core::MarkovChain;
use crate::distributions::{density, Covariance2, NumericalError, Point, ZeroMeanGaussian2D};
use crate::random::{RandomSource, SeededSource};

/// A rejected move: the state the chain stayed in and the proposal it turned down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rejection {
    pub current: Point,
    pub proposed: Point,
}

/// Whether the chain has been seeded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
    Uninitialized,
    Running,
}

/**
Computes the Metropolis acceptance ratio `min(1, π(proposed) / π(current))` for the target
`N(0, target)`.

The result is always in `[0, 1]`. If the current state has density zero (it lies so far out
that the density underflows) any move is accepted.

# Errors

Returns a [`NumericalError`] if `target` is not a valid covariance.
*/
pub fn acceptance_ratio(
    target: &Covariance2,
    current: &Point,
    proposed: &Point,
) -> Result<f64, NumericalError> {
    let p_current = density(target, current)?;
    let p_proposed = density(target, proposed)?;
    Ok(ratio_of(p_current, p_proposed))
}

fn ratio_of(p_current: f64, p_proposed: f64) -> f64 {
    if p_current <= 0.0 {
        1.0
    } else {
        (p_proposed / p_current).min(1.0)
    }
}

/**
The Metropolis chain together with its accepted chain and rejected log.

# Type Parameters
- `R`: the [`RandomSource`] the chain draws from. Defaults to [`SeededSource`].

# Examples

```rust
use mini_metropolis::core::MarkovChain;
use mini_metropolis::distributions::{Covariance2, Point};
use mini_metropolis::metropolis::{ChainPhase, Metropolis2D, StepOutcome};
use mini_metropolis::random::ScriptedSource;

let target = Covariance2::new(0.5, 0.2, 0.2, 0.5);
let proposal = Covariance2::diagonal(0.25, 0.25);
let rng = ScriptedSource::new(vec![0.3, 0.7], vec![]);
let mut mh = Metropolis2D::with_source(target, proposal, rng).unwrap();

assert_eq!(mh.phase(), ChainPhase::Uninitialized);
let outcome = mh.step().unwrap();
assert_eq!(outcome, StepOutcome::Seeded(Point::new(0.3, 0.7)));
assert_eq!(mh.phase(), ChainPhase::Running);
```
*/
#[derive(Debug, Clone)]
pub struct Metropolis2D<R = SeededSource> {
    /// Covariance Σ of the target density.
    pub target: Covariance2,
    /// The proposal distribution `N(0, Σ₂)`.
    pub proposal: ZeroMeanGaussian2D,
    accepted: Vec<Point>,
    rejected: Vec<Rejection>,
    rng: R,
}

impl Metropolis2D<SeededSource> {
    /**
    Creates an unseeded chain drawing from a [`SeededSource`] with a random seed.

    The target covariance is not checked here; an invalid target surfaces as an error on the
    first tick that evaluates the density. The proposal covariance is factorized immediately.
    */
    pub fn new(target: Covariance2, proposal: Covariance2) -> Result<Self, NumericalError> {
        Self::with_source(target, proposal, SeededSource::from_entropy())
    }

    /// Replaces the random source with one seeded by `seed`.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.rng = SeededSource::new(seed);
        self
    }

    /// The seed of the underlying random source.
    pub fn seed(&self) -> u64 {
        self.rng.seed
    }
}

impl<R: RandomSource> Metropolis2D<R> {
    pub fn with_source(
        target: Covariance2,
        proposal: Covariance2,
        rng: R,
    ) -> Result<Self, NumericalError> {
        Ok(Self {
            target,
            proposal: ZeroMeanGaussian2D::new(proposal)?,
            accepted: Vec::new(),
            rejected: Vec::new(),
            rng,
        })
    }

    pub fn phase(&self) -> ChainPhase {
        if self.accepted.is_empty() {
            ChainPhase::Uninitialized
        } else {
            ChainPhase::Running
        }
    }

    /// The accepted chain, oldest first.
    pub fn accepted(&self) -> &[Point] {
        &self.accepted
    }

    /// The rejected log, oldest first.
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }

    /// Number of ticks taken so far.
    pub fn ticks(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// Hands back the accepted chain and rejected log, consuming the sampler.
    pub fn into_trace(self) -> (Vec<Point>, Vec<Rejection>) {
        (self.accepted, self.rejected)
    }

    fn seed_chain(&mut self) -> StepOutcome {
        let u1 = self.rng.uniform();
        let u2 = self.rng.uniform();
        let start = Point::new(u1, u2);
        self.accepted.push(start);
        debug!("seeded chain at ({:.4}, {:.4})", start.x, start.y);
        StepOutcome::Seeded(start)
    }

    fn advance(&mut self, current: Point) -> Result<StepOutcome, NumericalError> {
        let p_current = density(&self.target, &current)?;
        let proposed = self.proposal.sample(&mut self.rng);
        let p_proposed = density(&self.target, &proposed)?;
        let ratio = ratio_of(p_current, p_proposed);

        let u = self.rng.uniform();
        if u <= ratio {
            self.accepted.push(proposed);
            debug!(
                "accepted ({:.4}, {:.4}) with a = {ratio:.4}, u = {u:.4}",
                proposed.x, proposed.y
            );
            Ok(StepOutcome::Accepted {
                from: current,
                to: proposed,
                ratio,
            })
        } else {
            self.rejected.push(Rejection { current, proposed });
            debug!(
                "rejected ({:.4}, {:.4}) with a = {ratio:.4}, u = {u:.4}",
                proposed.x, proposed.y
            );
            Ok(StepOutcome::Rejected {
                from: current,
                proposed,
                ratio,
            })
        }
    }
}

impl<R: RandomSource> MarkovChain for Metropolis2D<R> {
    /**
    Advances the chain by one tick.

    The first call seeds the chain; every later call proposes, evaluates and then either
    accepts or rejects. Exactly one of [`Metropolis2D::accepted`] and
    [`Metropolis2D::rejected`] grows by one element per successful call.

    # Errors

    Returns a [`NumericalError`] if the target covariance is invalid. The error is raised
    before any draw is taken and leaves both sequences untouched.
    */
    fn step(&mut self) -> Result<StepOutcome, NumericalError> {
        match self.accepted.last().copied() {
            None => Ok(self.seed_chain()),
            Some(current) => self.advance(current),
        }
    }

    fn current_state(&self) -> Option<Point> {
        self.accepted.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::run_chain;
    use crate::random::ScriptedSource;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn target() -> Covariance2 {
        Covariance2::new(0.5, 0.2, 0.2, 0.5)
    }

    fn proposal() -> Covariance2 {
        Covariance2::diagonal(0.25, 0.25)
    }

    #[test]
    fn test_counts_add_up() {
        for n in [1, 2, 25, 1_000] {
            let mut mh = Metropolis2D::new(target(), proposal()).unwrap().set_seed(42);
            run_chain(&mut mh, n).unwrap();
            assert_eq!(mh.accepted().len() + mh.rejected().len(), n);
            assert_eq!(mh.ticks(), n);
            assert!(!mh.accepted().is_empty());
        }
    }

    #[test]
    fn test_seed_point_in_unit_square() {
        for seed in 0..50 {
            let mut mh = Metropolis2D::new(target(), proposal()).unwrap().set_seed(seed);
            let outcome = mh.step().unwrap();
            let StepOutcome::Seeded(p) = outcome else {
                panic!("first tick must seed the chain, got {outcome:?}");
            };
            assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
            assert!(mh.rejected().is_empty());
        }
    }

    #[test]
    fn test_rejection_records_current_and_proposed() {
        // Seed (0, 0); the proposal (1.0, 1.0) has a < 1, and u = 0.999 rejects it.
        let rng = ScriptedSource::new(vec![0.0, 0.0, 0.999], vec![2.0, 2.0]);
        let mut mh = Metropolis2D::with_source(target(), proposal(), rng).unwrap();
        mh.step().unwrap();
        let outcome = mh.step().unwrap();

        let proposed = Point::new(1.0, 1.0);
        assert!(!outcome.is_accepted());
        assert_eq!(mh.accepted(), &[Point::new(0.0, 0.0)]);
        assert_eq!(
            mh.rejected(),
            &[Rejection {
                current: Point::new(0.0, 0.0),
                proposed
            }]
        );
        assert_eq!(mh.current_state(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_uphill_move_always_accepted() {
        // From (0.9, 0.1) to the origin the density ratio exceeds one.
        let rng = ScriptedSource::new(vec![0.9, 0.1, 0.999_999], vec![0.0, 0.0]);
        let mut mh = Metropolis2D::with_source(target(), proposal(), rng).unwrap();
        mh.step().unwrap();
        match mh.step().unwrap() {
            StepOutcome::Accepted { to, ratio, .. } => {
                assert_eq!(to, Point::new(0.0, 0.0));
                assert_eq!(ratio, 1.0);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_ratio_in_unit_interval() {
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..10_000 {
            let x = Point::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0));
            let y = Point::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0));
            let a = acceptance_ratio(&target(), &x, &y).unwrap();
            assert!((0.0..=1.0).contains(&a), "ratio {a} outside [0, 1]");
        }
    }

    #[test]
    fn test_ratio_when_current_density_underflows() {
        let far = Point::new(1e3, -1e3);
        assert_eq!(acceptance_ratio(&target(), &far, &far).unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_proposal_fails_at_construction() {
        let bad = Covariance2::new(0.0, 0.0, 0.0, 0.0);
        assert!(Metropolis2D::new(target(), bad).is_err());
    }

    #[test]
    fn test_set_seed_is_reported() {
        let mh = Metropolis2D::new(target(), proposal()).unwrap().set_seed(123);
        assert_eq!(mh.seed(), 123);
    }
}
