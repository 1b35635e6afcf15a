/*!
Run configuration: the two covariances, the tick count and the seed.

```rust
use mini_metropolis::config::RunConfig;

let config = RunConfig::default().set_ticks(100).set_seed(7);
let mh = config.build().unwrap();
assert_eq!(mh.seed(), 7);
```
*/

use crate::distributions::{ConfidenceEllipse, Covariance2, NumericalError};
use crate::metropolis::Metropolis2D;
use crate::random::SeededSource;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("tick count must be at least 1")]
    NoTicks,

    #[error("invalid {which} covariance: {source}")]
    Covariance {
        which: &'static str,
        #[source]
        source: NumericalError,
    },

    #[error("expected 4 comma-separated numbers for a 2x2 matrix, got {0:?}")]
    MatrixFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    /// Target covariance Σ.
    pub target: Covariance2,
    /// Proposal covariance Σ₂.
    pub proposal: Covariance2,
    /// Number of sampler ticks.
    pub ticks: usize,
    /// Seed for the random source; `None` draws one at build time.
    pub seed: Option<u64>,
    /// Half-width of the confidence ellipse, in standard deviations.
    pub n_std: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target: Covariance2::new(0.5, 0.2, 0.2, 0.5),
            proposal: Covariance2::diagonal(0.25, 0.25),
            ticks: 25,
            seed: None,
            n_std: 2.0,
        }
    }
}

impl RunConfig {
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn set_ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn set_target(mut self, target: Covariance2) -> Self {
        self.target = target;
        self
    }

    pub fn set_proposal(mut self, proposal: Covariance2) -> Self {
        self.proposal = proposal;
        self
    }

    /// Checks the tick count and both covariances.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks == 0 {
            return Err(ConfigError::NoTicks);
        }
        self.target
            .validate()
            .map_err(|source| ConfigError::Covariance {
                which: "target",
                source,
            })?;
        self.proposal
            .validate()
            .map_err(|source| ConfigError::Covariance {
                which: "proposal",
                source,
            })?;
        Ok(())
    }

    /// Validates the configuration and builds a sampler from it.
    pub fn build(&self) -> Result<Metropolis2D, ConfigError> {
        self.validate()?;
        let rng = match self.seed {
            Some(seed) => SeededSource::new(seed),
            None => SeededSource::from_entropy(),
        };
        Metropolis2D::with_source(self.target, self.proposal, rng).map_err(|source| {
            ConfigError::Covariance {
                which: "proposal",
                source,
            }
        })
    }

    /// The confidence ellipse of the target covariance.
    pub fn ellipse(&self) -> Result<ConfidenceEllipse, NumericalError> {
        ConfidenceEllipse::from_covariance(&self.target, self.n_std)
    }
}

/// Parses `"a,b,c,d"` as the row-major matrix `[[a, b], [c, d]]`.
pub fn parse_covariance(s: &str) -> Result<Covariance2, ConfigError> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| ConfigError::MatrixFormat(s.to_string()))?;
    match values[..] {
        [a, b, c, d] => Ok(Covariance2::new(a, b, c, d)),
        _ => Err(ConfigError::MatrixFormat(s.to_string())),
    }
}
