//! Payoffmc CLI - command-line pricing of expression-defined payoffs.
//!
//! # Commands
//!
//! - `payoffmc price --spot 100 --strike 100 --volatility 0.2 --maturity 1`
//!   - price a payoff by Monte Carlo simulation
//! - `payoffmc check --payoff "max(ST - K, 0)"` - compile a payoff
//!   without pricing it
//!
//! # Architecture
//!
//! As the service layer, this binary is the collaborator around the
//! pricing core: it assembles the request bundle, invokes the pricer,
//! and formats a number or a typed error. Logging lives here; the core
//! never logs.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;

pub use error::{CliError, Result};

/// Monte Carlo pricing with payoffs supplied as text
#[derive(Parser)]
#[command(name = "payoffmc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a payoff expression by Monte Carlo simulation
    Price(commands::price::PriceArgs),

    /// Compile a payoff expression and report acceptance or rejection
    Check {
        /// Payoff expression to compile
        #[arg(long)]
        payoff: String,
    },
}

fn main() -> Result<()> {
    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Price(args) => commands::price::run(&args),
        Commands::Check { payoff } => commands::check::run(&payoff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
