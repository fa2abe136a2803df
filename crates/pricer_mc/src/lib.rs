//! # Monte Carlo Pricer (Layer P: Pricing Kernel)
//!
//! Prices derivatives under lognormal (Black-Scholes) dynamics with the
//! payoff supplied as text and compiled by [`payoff_lang`].
//!
//! ## Architecture
//!
//! ```text
//! MonteCarloPricer
//! ├── SimulationRequest  (validated parameter bundle)
//! ├── payoff_lang        (compile once per request)
//! ├── SimRng             (explicit, caller-owned randomness)
//! ├── GbmPath            (terminal-price sampling)
//! └── aggregation        (discounted mean + standard error)
//! ```
//!
//! The core exposes two operations: compiling a payoff
//! (re-exported [`compile_payoff`]) and pricing a request
//! ([`MonteCarloPricer::price`], with a rayon-sharded
//! [`MonteCarloPricer::price_parallel`] variant). Everything else —
//! transport, formatting, logging — belongs to callers. The core never
//! logs; every failure is a typed [`PricingError`].
//!
//! ## Usage
//!
//! ```rust
//! use pricer_mc::{MonteCarloPricer, SimulationRequest};
//!
//! let request = SimulationRequest {
//!     payoff_expression: "max(ST - K, 0)".to_string(),
//!     simulations: 50_000,
//!     ..Default::default()
//! };
//!
//! let result = MonteCarloPricer::with_seed(42).price(&request).unwrap();
//! assert!(result.price > 0.0);
//! ```

pub mod analytic;
pub mod error;
pub mod pricer;
pub mod request;
pub mod rng;
pub mod sampler;

pub use error::PricingError;
pub use payoff_lang::{compile_payoff, CompiledPayoff, NameEnv};
pub use pricer::{price, MonteCarloPricer, PricingResult};
pub use request::{SimulationRequest, MAX_SIMULATIONS, TERMINAL_PRICE_VAR};
pub use rng::SimRng;
pub use sampler::GbmPath;
