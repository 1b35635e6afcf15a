//! The tick-driven chain interface and the bounded drivers that run it.

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::distributions::{NumericalError, Point};

/// What a single tick appended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The first tick: an unconditionally accepted starting point.
    Seeded(Point),
    /// `to` was appended to the accepted chain.
    Accepted { from: Point, to: Point, ratio: f64 },
    /// `(from, proposed)` was appended to the rejected log.
    Rejected {
        from: Point,
        proposed: Point,
        ratio: f64,
    },
}

impl StepOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, StepOutcome::Rejected { .. })
    }
}

pub trait MarkovChain {
    /// Does one tick of the chain and reports what it appended.
    fn step(&mut self) -> Result<StepOutcome, NumericalError>;

    /// The current state, or `None` before the first tick.
    fn current_state(&self) -> Option<Point>;
}

/// Runs `n_steps` ticks and returns their outcomes. Stops at the first error.
pub fn run_chain<M>(chain: &mut M, n_steps: usize) -> Result<Vec<StepOutcome>, NumericalError>
where
    M: MarkovChain,
{
    run_chain_with(chain, n_steps, |_, _, _| {})
}

/**
Runs `n_steps` ticks, calling `observer(tick, outcome, chain)` after each one.

The observer only gets shared access to the chain, so it can read the accepted chain and
rejected log between ticks but never modify them. Ticks are numbered from zero.

# Examples

```rust
use mini_metropolis::core::run_chain_with;
use mini_metropolis::distributions::Covariance2;
use mini_metropolis::metropolis::Metropolis2D;

let mut mh = Metropolis2D::new(
    Covariance2::new(0.5, 0.2, 0.2, 0.5),
    Covariance2::diagonal(0.25, 0.25),
)
.unwrap()
.set_seed(1);

let mut lengths = Vec::new();
run_chain_with(&mut mh, 10, |_, _, chain| {
    lengths.push(chain.accepted().len() + chain.rejected().len());
})
.unwrap();
assert_eq!(lengths, (1..=10).collect::<Vec<_>>());
```
*/
pub fn run_chain_with<M, F>(
    chain: &mut M,
    n_steps: usize,
    mut observer: F,
) -> Result<Vec<StepOutcome>, NumericalError>
where
    M: MarkovChain,
    F: FnMut(usize, &StepOutcome, &M),
{
    info!("running chain for {n_steps} ticks");
    let mut outcomes = Vec::with_capacity(n_steps);

    for i in 0..n_steps {
        let outcome = chain.step()?;
        observer(i, &outcome, chain);
        outcomes.push(outcome);
    }

    let n_accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
    info!(
        "finished {n_steps} ticks: {n_accepted} accepted, {} rejected",
        n_steps - n_accepted
    );
    Ok(outcomes)
}

pub fn run_chain_with_progress<M>(
    chain: &mut M,
    n_steps: usize,
    pb: &ProgressBar,
) -> Result<Vec<StepOutcome>, NumericalError>
where
    M: MarkovChain,
{
    pb.set_length(n_steps as u64);

    let outcomes = run_chain_with(chain, n_steps, |_, _, _| {
        // Update progress bar
        pb.inc(1);
    })?;

    pb.finish_with_message("Done!");
    Ok(outcomes)
}

/// Like [`run_chain_with_progress`], with a freshly styled progress bar.
pub fn run_progress<M>(chain: &mut M, n_steps: usize) -> Result<Vec<StepOutcome>, NumericalError>
where
    M: MarkovChain,
{
    let pb = ProgressBar::new(n_steps as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_prefix("Chain");
    run_chain_with_progress(chain, n_steps, &pb)
}
