//! Pricing request bundle and validation.
//!
//! A [`SimulationRequest`] is constructed once per pricing call from
//! untrusted input and is immutable thereafter. [`SimulationRequest::validate`]
//! is the single gate for every request invariant; the pricer runs it
//! before compiling the payoff or drawing a single sample.

use payoff_lang::NameEnv;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Maximum number of simulation draws allowed per request.
pub const MAX_SIMULATIONS: usize = 10_000_000;

/// Name bound to the simulated terminal price on each draw.
pub const TERMINAL_PRICE_VAR: &str = "ST";

/// Payoff expression used when the caller does not supply one.
pub const DEFAULT_PAYOFF: &str = "max(ST - K, 0)";

/// Simulation count used when the caller does not supply one.
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Parameters of one pricing call.
///
/// # Invariants (checked by [`validate`](Self::validate))
/// - all numeric fields are finite
/// - `spot > 0`, `strike > 0`, `maturity > 0`
/// - `volatility >= 0` — zero is the deterministic degenerate case
///   where every path ends at `spot * exp(rate * maturity)`
/// - `1 <= simulations <= MAX_SIMULATIONS`
///
/// The rate may take any sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Current asset price.
    pub spot: f64,
    /// Strike, bound as `K` in the payoff environment.
    pub strike: f64,
    /// Continuously-compounded risk-free rate, bound as `r`.
    pub rate: f64,
    /// Annualised volatility, bound as `sigma`.
    pub volatility: f64,
    /// Maturity in years, bound as `T`.
    pub maturity: f64,
    /// Number of Monte Carlo draws.
    pub simulations: usize,
    /// Payoff expression, e.g. `max(ST - K, 0)`.
    pub payoff_expression: String,
}

impl SimulationRequest {
    /// Check every request invariant, in field order.
    ///
    /// # Errors
    /// `PricingError::InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<(), PricingError> {
        Self::finite_positive("spot", self.spot)?;
        Self::finite_positive("strike", self.strike)?;
        Self::finite("rate", self.rate)?;

        Self::finite("volatility", self.volatility)?;
        if self.volatility < 0.0 {
            return Err(PricingError::InvalidParameter {
                field: "volatility",
                message: format!("must be non-negative, got {}", self.volatility),
            });
        }

        Self::finite_positive("maturity", self.maturity)?;

        if self.simulations == 0 || self.simulations > MAX_SIMULATIONS {
            return Err(PricingError::InvalidParameter {
                field: "simulations",
                message: format!(
                    "must be in range [1, {MAX_SIMULATIONS}], got {}",
                    self.simulations
                ),
            });
        }

        Ok(())
    }

    /// The constants layer of the payoff environment: `K`, `r`,
    /// `sigma`, `T`.
    pub fn constant_env(&self) -> NameEnv {
        NameEnv::with_constants([
            ("K", self.strike),
            ("r", self.rate),
            ("sigma", self.volatility),
            ("T", self.maturity),
        ])
    }

    /// Present-value discount factor `exp(-rate * maturity)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    fn finite(field: &'static str, value: f64) -> Result<(), PricingError> {
        if !value.is_finite() {
            return Err(PricingError::InvalidParameter {
                field,
                message: format!("must be finite, got {value}"),
            });
        }
        Ok(())
    }

    fn finite_positive(field: &'static str, value: f64) -> Result<(), PricingError> {
        Self::finite(field, value)?;
        if value <= 0.0 {
            return Err(PricingError::InvalidParameter {
                field,
                message: format!("must be positive, got {value}"),
            });
        }
        Ok(())
    }
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            spot: 100.0,
            strike: 100.0,
            rate: 0.05,
            volatility: 0.2,
            maturity: 1.0,
            simulations: DEFAULT_SIMULATIONS,
            payoff_expression: DEFAULT_PAYOFF.to_string(),
        }
    }
}
