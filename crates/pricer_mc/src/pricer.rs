//! Monte Carlo pricing engine.
//!
//! Orchestration per pricing call:
//!
//! 1. validate the request (every invariant, before any work);
//! 2. compile the payoff expression once;
//! 3. build the name environment with the contract constants;
//! 4. loop over draws: sample a terminal price, rebind the per-draw
//!    variable, evaluate the payoff, accumulate;
//! 5. discount the sample mean and reject a non-finite result.
//!
//! Plain Monte Carlo: no antithetic variates, no control variates, no
//! other variance reduction. The first error in any draw aborts the
//! whole call.
//!
//! [`MonteCarloPricer::price_parallel`] shards the draw count across
//! rayon workers. Each shard owns an independent RNG stream derived
//! from a per-call base seed, the compiled payoff is shared read-only,
//! and partial sums combine associatively — so the parallel price
//! agrees with the sequential one statistically, not bitwise. A failing
//! shard fails the call; completed work from other shards is discarded.

use rayon::prelude::*;
use serde::Serialize;

use payoff_lang::compile_payoff;

use crate::error::PricingError;
use crate::request::{SimulationRequest, TERMINAL_PRICE_VAR};
use crate::rng::SimRng;
use crate::sampler::GbmPath;

/// Result of one pricing call.
///
/// # Examples
///
/// ```rust
/// use pricer_mc::{MonteCarloPricer, SimulationRequest};
///
/// let request = SimulationRequest::default();
/// let result = MonteCarloPricer::with_seed(42).price(&request).unwrap();
/// println!("price: {:.4} +/- {:.4}", result.price, result.confidence_95());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PricingResult {
    /// Discounted mean payoff.
    pub price: f64,
    /// Standard error of the price estimate.
    pub std_error: f64,
}

impl PricingResult {
    /// Returns the 95% confidence interval half-width.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }

    /// Returns the 99% confidence interval half-width.
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.std_error
    }
}

/// Monte Carlo pricing engine for expression-defined payoffs.
///
/// Owns an explicit random source. `new()` seeds from OS entropy, so
/// repeated calls are deliberately not reproducible; use
/// [`with_seed`](Self::with_seed) to pin the stream.
pub struct MonteCarloPricer {
    rng: SimRng,
}

impl MonteCarloPricer {
    /// A pricer seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: SimRng::from_entropy(),
        }
    }

    /// A pricer with a pinned seed, for reproducible pricing.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimRng::from_seed(seed),
        }
    }

    /// Price a request with sequential draws.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` before any simulation work
    /// - `Compile` if the payoff expression is rejected
    /// - `Evaluation` from the first failing draw
    /// - `NonFiniteResult` if the discounted mean is not finite
    pub fn price(&mut self, request: &SimulationRequest) -> Result<PricingResult, PricingError> {
        request.validate()?;
        let payoff = compile_payoff(&request.payoff_expression)?;

        let path = GbmPath::new(request.spot, request.rate, request.volatility, request.maturity);
        let mut env = request.constant_env();

        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for _ in 0..request.simulations {
            let terminal = path.sample(&mut self.rng);
            env.bind(TERMINAL_PRICE_VAR, terminal);
            let value = payoff.eval(&env)?;
            sum += value;
            sum_sq += value * value;
        }

        aggregate(request, sum, sum_sq)
    }

    /// Price a request with draws sharded across rayon workers.
    ///
    /// Equivalent to [`price`](Self::price) in distribution; summation
    /// order and stream assignment differ, so the estimate matches
    /// statistically rather than bit-for-bit.
    pub fn price_parallel(
        &mut self,
        request: &SimulationRequest,
    ) -> Result<PricingResult, PricingError> {
        request.validate()?;
        let payoff = compile_payoff(&request.payoff_expression)?;

        let path = GbmPath::new(request.spot, request.rate, request.volatility, request.maturity);
        let base_env = request.constant_env();

        // Fresh base seed per call so repeated calls on one pricer do
        // not replay the same shard streams.
        let base_seed = self.rng.gen_seed();

        let shards = rayon::current_num_threads().max(1).min(request.simulations);
        let per_shard = request.simulations / shards;
        let remainder = request.simulations % shards;

        let partials: Result<Vec<(f64, f64)>, PricingError> = (0..shards)
            .into_par_iter()
            .map(|shard| {
                let draws = per_shard + usize::from(shard < remainder);
                let mut rng = SimRng::stream(base_seed, shard as u64);
                let mut env = base_env.clone();

                let mut sum = 0.0;
                let mut sum_sq = 0.0;
                for _ in 0..draws {
                    let terminal = path.sample(&mut rng);
                    env.bind(TERMINAL_PRICE_VAR, terminal);
                    let value = payoff.eval(&env)?;
                    sum += value;
                    sum_sq += value * value;
                }
                Ok((sum, sum_sq))
            })
            .collect();

        let (sum, sum_sq) = partials?
            .into_iter()
            .fold((0.0, 0.0), |(s, q), (ps, pq)| (s + ps, q + pq));

        aggregate(request, sum, sum_sq)
    }
}

impl Default for MonteCarloPricer {
    fn default() -> Self {
        Self::new()
    }
}

/// Price a request with a one-off entropy-seeded pricer.
///
/// Convenience wrapper over [`MonteCarloPricer::price`].
pub fn price(request: &SimulationRequest) -> Result<PricingResult, PricingError> {
    MonteCarloPricer::new().price(request)
}

fn aggregate(
    request: &SimulationRequest,
    sum: f64,
    sum_sq: f64,
) -> Result<PricingResult, PricingError> {
    let n = request.simulations as f64;
    let discount = request.discount_factor();

    let mean = sum / n;
    let price = discount * mean;
    if !price.is_finite() {
        return Err(PricingError::NonFiniteResult);
    }

    let std_error = if request.simulations > 1 {
        let variance = ((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0);
        (variance / n).sqrt()
    } else {
        0.0
    };

    Ok(PricingResult {
        price,
        std_error: discount * std_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use payoff_lang::{CompileError, EvalError};

    fn request(payoff: &str, simulations: usize) -> SimulationRequest {
        SimulationRequest {
            payoff_expression: payoff.to_string(),
            simulations,
            ..Default::default()
        }
    }

    #[test]
    fn test_vanilla_call_price_is_positive() {
        let mut pricer = MonteCarloPricer::with_seed(42);
        let result = pricer.price(&request("max(ST - K, 0)", 10_000)).unwrap();
        assert!(result.price > 0.0);
        assert!(result.std_error > 0.0);
        assert!(result.std_error < result.price);
    }

    #[test]
    fn test_seeded_pricing_is_reproducible() {
        let req = request("max(ST - K, 0)", 5_000);
        let a = MonteCarloPricer::with_seed(42).price(&req).unwrap();
        let b = MonteCarloPricer::with_seed(42).price(&req).unwrap();
        assert_eq!(a.price.to_bits(), b.price.to_bits());
        assert_eq!(a.std_error.to_bits(), b.std_error.to_bits());
    }

    #[test]
    fn test_consecutive_calls_advance_the_stream() {
        let req = request("max(ST - K, 0)", 5_000);
        let mut pricer = MonteCarloPricer::with_seed(42);
        let a = pricer.price(&req).unwrap();
        let b = pricer.price(&req).unwrap();
        assert_ne!(a.price.to_bits(), b.price.to_bits());
    }

    #[test]
    fn test_degenerate_volatility_is_exact() {
        // With sigma = 0 every draw lands on the forward, so a single
        // draw already gives the exact discounted payoff.
        let req = SimulationRequest {
            volatility: 0.0,
            simulations: 1,
            ..request("max(ST - K, 0)", 1)
        };
        let result = MonteCarloPricer::with_seed(7).price(&req).unwrap();

        let forward = req.spot * (req.rate * req.maturity).exp();
        let expected = req.discount_factor() * (forward - req.strike).max(0.0);
        assert_eq!(result.price.to_bits(), expected.to_bits());
        assert_eq!(result.std_error, 0.0);
    }

    #[test]
    fn test_degenerate_volatility_many_draws() {
        let req = SimulationRequest {
            volatility: 0.0,
            ..request("max(ST - K, 0)", 10_000)
        };
        let result = MonteCarloPricer::new().price(&req).unwrap();
        let forward = req.spot * (req.rate * req.maturity).exp();
        let expected = req.discount_factor() * (forward - req.strike).max(0.0);
        assert_relative_eq!(result.price, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_validation_runs_before_any_draw() {
        // An invalid simulation count must win over a payoff that would
        // fail every draw.
        let req = request("log(ST - 1000000)", 0);
        match MonteCarloPricer::new().price(&req) {
            Err(PricingError::InvalidParameter { field: "simulations", .. }) => {}
            other => panic!("expected parameter rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_compile_error_propagates() {
        let req = request("max(ST", 100);
        match MonteCarloPricer::new().price(&req) {
            Err(PricingError::Compile(CompileError::Parse { source_text, .. })) => {
                assert_eq!(source_text, "max(ST");
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_element_propagates() {
        let req = request("__import__('os').system('true')", 100);
        match MonteCarloPricer::new().price(&req) {
            Err(PricingError::Compile(CompileError::UnsupportedElement { .. })) => {}
            other => panic!("expected unsupported element, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_name_aborts_the_call() {
        let req = request("ST - S0", 100);
        match MonteCarloPricer::new().price(&req) {
            Err(PricingError::Evaluation(EvalError::UnknownName { name })) => {
                assert_eq!(name, "S0");
            }
            other => panic!("expected unknown name, got {other:?}"),
        }
    }

    #[test]
    fn test_domain_error_aborts_the_call() {
        // ST stays far below 1e6, so log's argument is negative on
        // every draw; the first one aborts the call.
        let req = request("log(ST - 1000000)", 10_000);
        match MonteCarloPricer::with_seed(42).price(&req) {
            Err(PricingError::Evaluation(EvalError::Domain { function: "log", .. })) => {}
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn test_parallel_agrees_with_sequential() {
        let req = request("max(ST - K, 0)", 100_000);
        let seq = MonteCarloPricer::with_seed(42).price(&req).unwrap();
        let par = MonteCarloPricer::with_seed(42).price_parallel(&req).unwrap();
        let tolerance = 5.0 * (seq.std_error + par.std_error);
        assert!(
            (seq.price - par.price).abs() < tolerance,
            "sequential {} vs parallel {} (tolerance {tolerance})",
            seq.price,
            par.price
        );
    }

    #[test]
    fn test_parallel_propagates_errors() {
        let req = request("log(ST - 1000000)", 10_000);
        match MonteCarloPricer::with_seed(42).price_parallel(&req) {
            Err(PricingError::Evaluation(EvalError::Domain { .. })) => {}
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn test_parallel_single_draw() {
        let req = SimulationRequest {
            volatility: 0.0,
            ..request("max(ST - K, 0)", 1)
        };
        let result = MonteCarloPricer::new().price_parallel(&req).unwrap();
        let forward = req.spot * (req.rate * req.maturity).exp();
        let expected = req.discount_factor() * (forward - req.strike).max(0.0);
        assert_relative_eq!(result.price, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_confidence_helpers() {
        let result = PricingResult {
            price: 10.0,
            std_error: 0.1,
        };
        assert_relative_eq!(result.confidence_95(), 0.196, epsilon = 1e-12);
        assert_relative_eq!(result.confidence_99(), 0.2576, epsilon = 1e-12);
    }
}
