//! Summary statistics of a finished (or paused) chain.

use ndarray::prelude::*;
use ndarray_stats::CorrelationExt;

use crate::distributions::{Covariance2, Point};
use crate::metropolis::Rejection;

/// Lays out points as an `n × 2` array, one row per point.
pub fn points_to_array(points: &[Point]) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((points.len(), 2));
    for (mut row, p) in out.axis_iter_mut(Axis(0)).zip(points) {
        row[0] = p.x;
        row[1] = p.y;
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainSummary {
    pub ticks: usize,
    pub n_accepted: usize,
    pub n_rejected: usize,
    /// Fraction of ticks after the seeding tick that were accepted.
    pub acceptance_rate: f64,
    /// Mean of the accepted chain, `None` if it is empty.
    pub mean: Option<Point>,
    /// Sample covariance (ddof = 1) of the accepted chain, `None` with fewer than two points.
    pub covariance: Option<Covariance2>,
}

impl ChainSummary {
    pub fn from_trace(accepted: &[Point], rejected: &[Rejection]) -> Self {
        let n_accepted = accepted.len();
        let n_rejected = rejected.len();
        let ticks = n_accepted + n_rejected;

        // The seeding tick is not a Metropolis decision.
        let decisions = ticks.saturating_sub(1);
        let acceptance_rate = if decisions == 0 {
            0.0
        } else {
            n_accepted.saturating_sub(1) as f64 / decisions as f64
        };

        let arr = points_to_array(accepted);
        let mean = arr
            .mean_axis(Axis(0))
            .map(|m| Point::new(m[0], m[1]));
        let covariance = if n_accepted >= 2 {
            arr.t().cov(1.0).ok().map(|c| {
                Covariance2::new(c[[0, 0]], c[[0, 1]], c[[1, 0]], c[[1, 1]])
            })
        } else {
            None
        };

        Self {
            ticks,
            n_accepted,
            n_rejected,
            acceptance_rate,
            mean,
            covariance,
        }
    }
}
