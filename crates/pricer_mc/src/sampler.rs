//! Terminal-price sampling under lognormal dynamics.
//!
//! One draw maps a standard normal variate to the asset price at
//! maturity via the exact log-space solution of geometric Brownian
//! motion:
//!
//! ```text
//! ST = spot * exp((rate - 0.5*sigma^2)*T + sigma*sqrt(T)*z)
//! ```
//!
//! The deterministic drift and diffusion coefficients depend only on
//! the request, so they are computed once and reused for every draw.

use crate::rng::SimRng;

/// Precomputed lognormal terminal-price sampler.
///
/// Parameter validation is the caller's responsibility (the request is
/// validated before the simulation loop starts); constructing a sampler
/// with a negative maturity or volatility is a programming error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmPath {
    spot: f64,
    drift: f64,
    diffusion: f64,
}

impl GbmPath {
    /// Build a sampler for the given dynamics.
    ///
    /// With `volatility = 0` the diffusion term vanishes and every draw
    /// returns `spot * exp(rate * maturity)` regardless of the variate.
    pub fn new(spot: f64, rate: f64, volatility: f64, maturity: f64) -> Self {
        debug_assert!(spot > 0.0, "spot must be positive");
        debug_assert!(volatility >= 0.0, "volatility must be non-negative");
        debug_assert!(maturity > 0.0, "maturity must be positive");

        Self {
            spot,
            drift: (rate - 0.5 * volatility * volatility) * maturity,
            diffusion: volatility * maturity.sqrt(),
        }
    }

    /// Terminal price for one standard normal variate.
    #[inline]
    pub fn terminal(&self, z: f64) -> f64 {
        self.spot * (self.drift + self.diffusion * z).exp()
    }

    /// Draw a variate from `rng` and map it to a terminal price.
    #[inline]
    pub fn sample(&self, rng: &mut SimRng) -> f64 {
        self.terminal(rng.gen_normal())
    }
}
