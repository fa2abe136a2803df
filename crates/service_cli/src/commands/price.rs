//! Price command implementation.
//!
//! Builds a `SimulationRequest` from command-line flags, runs the
//! Monte Carlo pricer, and prints the result as JSON or plain text.

use clap::Args;
use tracing::info;

use pricer_mc::request::{DEFAULT_PAYOFF, DEFAULT_SIMULATIONS};
use pricer_mc::{MonteCarloPricer, SimulationRequest};

use crate::{CliError, Result};

/// Arguments for `payoffmc price`.
#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Current asset price
    #[arg(long)]
    spot: f64,

    /// Strike price (bound as K in the payoff)
    #[arg(long)]
    strike: f64,

    /// Risk-free rate (bound as r), may be negative
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rate: f64,

    /// Annualised volatility (bound as sigma)
    #[arg(long)]
    volatility: f64,

    /// Maturity in years (bound as T)
    #[arg(long)]
    maturity: f64,

    /// Number of Monte Carlo draws
    #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
    simulations: usize,

    /// Payoff expression; ST is the simulated terminal price
    #[arg(long, default_value = DEFAULT_PAYOFF)]
    payoff: String,

    /// Seed for reproducible pricing (omit for entropy seeding)
    #[arg(long)]
    seed: Option<u64>,

    /// Shard the draws across worker threads
    #[arg(long)]
    parallel: bool,

    /// Output format (json, plain)
    #[arg(long, default_value = "plain")]
    format: String,
}

/// Run the price command.
pub fn run(args: &PriceArgs) -> Result<()> {
    info!("Pricing payoff `{}`", args.payoff);
    info!("  spot={} strike={} rate={}", args.spot, args.strike, args.rate);
    info!("  volatility={} maturity={}", args.volatility, args.maturity);
    info!("  simulations={} parallel={}", args.simulations, args.parallel);

    let request = SimulationRequest {
        spot: args.spot,
        strike: args.strike,
        rate: args.rate,
        volatility: args.volatility,
        maturity: args.maturity,
        simulations: args.simulations,
        payoff_expression: args.payoff.clone(),
    };

    let mut pricer = match args.seed {
        Some(seed) => MonteCarloPricer::with_seed(seed),
        None => MonteCarloPricer::new(),
    };

    let result = if args.parallel {
        pricer.price_parallel(&request)?
    } else {
        pricer.price(&request)?
    };

    match args.format.as_str() {
        "json" => {
            let body = serde_json::json!({
                "price": result.price,
                "std_error": result.std_error,
            });
            println!("{body}");
        }
        "plain" => {
            println!("price      {:.6}", result.price);
            println!("std error  {:.6}", result.std_error);
            println!("95% CI     +/- {:.6}", result.confidence_95());
        }
        other => {
            return Err(CliError::InvalidArgument(format!(
                "unknown format: {other}. Supported: json, plain"
            )));
        }
    }

    Ok(())
}
