//! Kappa computation command.

use anyhow::{Context, Result};
use kappa_stat::{KappaSession, ReportOptions, Verbosity, format_report, to_json};

use crate::InputArgs;

pub fn run(
    input: &InputArgs,
    std_dev: bool,
    compare: Option<f64>,
    out: &str,
    precision: usize,
    json: bool,
) -> Result<()> {
    // Parse everything up front so no partial report is ever printed.
    let verbosity: Verbosity = out
        .parse()
        .with_context(|| format!("Invalid --out value {:?}", out))?;
    let config = super::config_from(input, std_dev, compare)?;

    log::info!(
        "Computing {} kappa on columns {:?} of {}",
        config.test,
        config.columns,
        input.input.display()
    );

    let result = KappaSession::new(config)
        .run_file(&input.input)
        .with_context(|| format!("Failed to compute kappa for {}", input.input.display()))?;

    if json {
        println!("{}", to_json(&result)?);
    } else {
        let options = ReportOptions {
            verbosity,
            precision,
        };
        print!("{}", format_report(&result, options));
    }

    Ok(())
}
