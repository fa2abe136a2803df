//! Check command implementation.
//!
//! Compiles a payoff expression (parse + grammar validation) without
//! pricing it, so users can vet an expression before a long simulation.

use tracing::info;

use payoff_lang::compile_payoff;

use crate::Result;

/// Run the check command.
pub fn run(payoff: &str) -> Result<()> {
    info!("Checking payoff `{payoff}`");
    let compiled = compile_payoff(payoff)?;
    println!("accepted: {payoff}");
    println!("root node: {}", compiled.tree().kind());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;
    use payoff_lang::CompileError;

    #[test]
    fn accepts_valid_payoffs() {
        assert!(run("max(ST - K, 0)").is_ok());
        assert!(run("abs(ST - K) if ST > K else 0").is_ok());
    }

    #[test]
    fn rejects_out_of_grammar_payoffs() {
        match run("__import__.os") {
            Err(CliError::Compile(CompileError::UnsupportedElement { .. })) => {}
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_payoffs() {
        match run("max(ST") {
            Err(CliError::Compile(CompileError::Parse { .. })) => {}
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
