//! Check command
//!
//! Usage: boneswipe check <EXPR>

use boneswipe_core::errors::SwError;
use boneswipe_core::Expression;
use clap::Args;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Predicate expression, e.g. 'endswith("_end") and depth > 2'
    pub expression: String,
}

/// Execute check command
pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let expression = Expression::compile(&args.expression).map_err(SwError::from)?;
    println!("✓ {}", expression);
    Ok(())
}
