/*!
Random sources used by the sampler.

Every random draw the chain needs goes through the [`RandomSource`] trait, so a run is
fully determined by the source it owns. [`SeededSource`] wraps a [`SmallRng`] and is what
the sampler uses in practice; [`ScriptedSource`] replays fixed draws and makes individual
ticks reproducible by hand.

# Examples

```rust
use mini_metropolis::random::{RandomSource, ScriptedSource, SeededSource};

let mut a = SeededSource::new(7);
let mut b = SeededSource::new(7);
assert_eq!(a.uniform(), b.uniform());

let mut scripted = ScriptedSource::new(vec![0.3, 0.7], vec![]);
assert_eq!(scripted.uniform(), 0.3);
assert_eq!(scripted.uniform(), 0.7);
```
*/

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use std::collections::VecDeque;

/// A source of the two kinds of draws a Metropolis tick consumes.
pub trait RandomSource {
    /// Draws from Uniform[0, 1).
    fn uniform(&mut self) -> f64;

    /// Draws from N(0, 1).
    fn standard_normal(&mut self) -> f64;
}

/// A [`RandomSource`] backed by a seeded [`SmallRng`].
#[derive(Debug, Clone)]
pub struct SeededSource {
    /// The seed the generator was created with.
    pub seed: u64,
    rng: SmallRng,
}

impl SeededSource {
    /// Creates a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Creates a source with a seed taken from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen::<u64>())
    }
}

impl RandomSource for SeededSource {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

/// A [`RandomSource`] that replays pre-recorded draws in order.
///
/// Uniform and normal draws are kept in separate queues. Once a queue is exhausted the
/// source falls back to a fixed value (`0.0` for both), so a script only needs to cover
/// the draws a test actually cares about.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    uniforms: VecDeque<f64>,
    normals: VecDeque<f64>,
}

impl ScriptedSource {
    pub fn new(uniforms: Vec<f64>, normals: Vec<f64>) -> Self {
        Self {
            uniforms: uniforms.into(),
            normals: normals.into(),
        }
    }

    /// Number of scripted uniform draws not yet consumed.
    pub fn remaining_uniforms(&self) -> usize {
        self.uniforms.len()
    }

    /// Number of scripted normal draws not yet consumed.
    pub fn remaining_normals(&self) -> usize {
        self.normals.len()
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().unwrap_or(0.0)
    }

    fn standard_normal(&mut self) -> f64 {
        self.normals.pop_front().unwrap_or(0.0)
    }
}
