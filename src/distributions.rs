/*!
Zero-mean bivariate Gaussians: the target density, the proposal distribution and the
confidence ellipse of a covariance.

All linear algebra here is the closed-form 2×2 kind. A covariance `[[a, b], [c, d]]` has
determinant `a·d − b·c` and inverse `(1/det)·[[d, −b], [−c, a]]`; the proposal draw uses the
2×2 Cholesky factor and the ellipse uses the 2×2 symmetric eigen-decomposition.

# Examples

```rust
use mini_metropolis::distributions::{density, Covariance2, Point};

let cov = Covariance2::new(0.5, 0.2, 0.2, 0.5);
let peak = density(&cov, &Point::new(0.0, 0.0)).unwrap();
assert!((peak - 0.3474).abs() < 1e-4);

// Singular covariances are rejected.
let singular = Covariance2::new(1.0, 1.0, 1.0, 1.0);
assert!(density(&singular, &Point::new(0.0, 0.0)).is_err());
```
*/

use std::f64::consts::PI;
use std::ops::Neg;

use crate::random::RandomSource;

/// A determinant at or below this fraction of `max(|a·d|, |b·c|)` is treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Largest allowed difference between the off-diagonal entries, relative to the largest entry.
pub const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Raised whenever a covariance cannot parameterize a Gaussian.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum NumericalError {
    #[error("covariance has a non-finite entry ([[{a}, {b}], [{c}, {d}]])")]
    NonFinite { a: f64, b: f64, c: f64, d: f64 },

    #[error("covariance is singular (det = {det})")]
    Singular { det: f64 },

    #[error("covariance is not positive-definite (det = {det}, a = {a})")]
    NotPositiveDefinite { det: f64, a: f64 },

    #[error("covariance is not symmetric (b = {b}, c = {c})")]
    Asymmetric { b: f64, c: f64 },
}

/// A state of the chain in the 2D sample space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point::new(p[0], p[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A 2×2 covariance matrix `[[a, b], [c, d]]`.
///
/// Construction never fails; the matrix is checked each time it is used, so a bad
/// configuration surfaces as a [`NumericalError`] at the point of use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariance2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Covariance2 {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// A diagonal covariance with variances `var_x` and `var_y`.
    pub fn diagonal(var_x: f64, var_y: f64) -> Self {
        Self::new(var_x, 0.0, 0.0, var_y)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /**
    Checks that the matrix is symmetric and positive-definite and returns its determinant.

    Both tolerances are relative to the scale of the entries, so a covariance and any positive
    multiple of it are accepted or refused together.

    # Errors

    - [`NumericalError::NonFinite`] if any entry is NaN or infinite.
    - [`NumericalError::Asymmetric`] if `|b − c|` exceeds [`SYMMETRY_TOLERANCE`] times the
      largest absolute entry.
    - [`NumericalError::Singular`] if `|det|` is at most [`SINGULAR_TOLERANCE`] times
      `max(|a·d|, |b·c|)`.
    - [`NumericalError::NotPositiveDefinite`] if `det < 0` or `a ≤ 0`.
    */
    pub fn validate(&self) -> Result<f64, NumericalError> {
        let Covariance2 { a, b, c, d } = *self;
        if ![a, b, c, d].iter().all(|v| v.is_finite()) {
            return Err(NumericalError::NonFinite { a, b, c, d });
        }

        let largest = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
        if (b - c).abs() > SYMMETRY_TOLERANCE * largest {
            return Err(NumericalError::Asymmetric { b, c });
        }

        let det = self.determinant();
        let scale = (a * d).abs().max((b * c).abs());
        if det.abs() <= SINGULAR_TOLERANCE * scale {
            return Err(NumericalError::Singular { det });
        }
        if det < 0.0 || a <= 0.0 {
            return Err(NumericalError::NotPositiveDefinite { det, a });
        }
        Ok(det)
    }

    /// The inverse matrix, after validating.
    pub fn inverse(&self) -> Result<Covariance2, NumericalError> {
        let det = self.validate()?;
        Ok(Covariance2::new(
            self.d / det,
            -self.b / det,
            -self.c / det,
            self.a / det,
        ))
    }

    /// Lower Cholesky factor `[[l11, 0], [l21, l22]]`, returned as `(l11, l21, l22)`.
    pub fn cholesky(&self) -> Result<(f64, f64, f64), NumericalError> {
        self.validate()?;
        let l11 = self.a.sqrt();
        let l21 = self.c / l11;
        let l22 = (self.d - l21 * l21).sqrt();
        Ok((l11, l21, l22))
    }

    /// Eigenvalues in descending order with the unit eigenvector of the larger one.
    pub fn eigen(&self) -> Result<Eigen2, NumericalError> {
        self.validate()?;
        let mid = 0.5 * (self.a + self.d);
        let half_gap = 0.5 * (self.a - self.d);
        let radius = (half_gap * half_gap + self.b * self.b).sqrt();
        let major = mid + radius;
        let minor = mid - radius;

        let (vx, vy) = if self.b != 0.0 {
            (major - self.d, self.b)
        } else if self.a >= self.d {
            (1.0, 0.0)
        } else {
            (0.0, 1.0)
        };
        let norm = vx.hypot(vy);

        Ok(Eigen2 {
            values: [major, minor],
            major_axis: Point::new(vx / norm, vy / norm),
        })
    }

    /// `xᵗ · self · x`.
    fn quadratic_form(&self, p: &Point) -> f64 {
        p.x * (self.a * p.x + self.b * p.y) + p.y * (self.c * p.x + self.d * p.y)
    }
}

impl From<[[f64; 2]; 2]> for Covariance2 {
    fn from(m: [[f64; 2]; 2]) -> Self {
        Covariance2::new(m[0][0], m[0][1], m[1][0], m[1][1])
    }
}

/// Eigen-decomposition of a symmetric 2×2 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigen2 {
    /// Eigenvalues, largest first.
    pub values: [f64; 2],
    /// Unit eigenvector belonging to `values[0]`.
    pub major_axis: Point,
}

/**
Evaluates the zero-mean bivariate normal density with covariance `cov` at `x`:

`1 / (2π·sqrt(det Σ)) · exp(−0.5 · xᵗ Σ⁻¹ x)`

The density is even in `x` and peaks at the origin.

# Errors

Returns a [`NumericalError`] if `cov` has a non-finite entry or is asymmetric, singular or
indefinite.
*/
pub fn density(cov: &Covariance2, x: &Point) -> Result<f64, NumericalError> {
    let det = cov.validate()?;
    let precision = cov.inverse()?;
    let norm = 1.0 / (2.0 * PI * det.sqrt());
    Ok(norm * (-0.5 * precision.quadratic_form(x)).exp())
}

/**
A zero-mean Gaussian proposal `N(0, Σ₂)`.

Draws are independent of the chain's current state: `x' = L·z` with `L` the Cholesky
factor of Σ₂ and `z` two standard-normal draws.

# Examples

```rust
use mini_metropolis::distributions::{Covariance2, ZeroMeanGaussian2D};
use mini_metropolis::random::ScriptedSource;

let proposal = ZeroMeanGaussian2D::new(Covariance2::diagonal(0.25, 0.25)).unwrap();
let mut rng = ScriptedSource::new(vec![], vec![1.0, -2.0]);
let p = proposal.sample(&mut rng);
assert_eq!((p.x, p.y), (0.5, -1.0));
```
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroMeanGaussian2D {
    pub cov: Covariance2,
    l11: f64,
    l21: f64,
    l22: f64,
}

impl ZeroMeanGaussian2D {
    pub fn new(cov: Covariance2) -> Result<Self, NumericalError> {
        let (l11, l21, l22) = cov.cholesky()?;
        Ok(Self { cov, l11, l21, l22 })
    }

    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Point {
        let z1 = rng.standard_normal();
        let z2 = rng.standard_normal();
        Point::new(self.l11 * z1, self.l21 * z1 + self.l22 * z2)
    }
}

/**
The confidence ellipse of a zero-mean Gaussian, centred at the origin.

`width` and `height` are full axis lengths (`2 · n_std · sqrt(λ)`), and `angle_deg` is the
rotation of the major axis from the x-axis.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceEllipse {
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

impl ConfidenceEllipse {
    pub fn from_covariance(cov: &Covariance2, n_std: f64) -> Result<Self, NumericalError> {
        let eig = cov.eigen()?;
        Ok(Self {
            width: 2.0 * n_std * eig.values[0].sqrt(),
            height: 2.0 * n_std * eig.values[1].sqrt(),
            angle_deg: eig.major_axis.y.atan2(eig.major_axis.x).to_degrees(),
        })
    }
}
