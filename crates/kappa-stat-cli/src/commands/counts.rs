//! Agreement count export command.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use kappa_stat::{KappaSession, RatingTable, write_counts_csv};

use crate::InputArgs;

pub fn run(input: &InputArgs, output: Option<PathBuf>) -> Result<()> {
    let config = super::config_from(input, false, None)?;
    let table = RatingTable::load(&input.input)
        .with_context(|| format!("Failed to load {}", input.input.display()))?;
    let tabulation = KappaSession::new(config)
        .tabulate(&table)
        .with_context(|| format!("Failed to tabulate {}", input.input.display()))?;

    log::info!(
        "Tabulated {} subjects over categories {}..={}",
        tabulation.counts.subject_count(),
        tabulation.categories.min,
        tabulation.categories.max
    );

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_counts_csv(&tabulation, file)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            eprintln!("Saved to: {}", path.display());
        }
        None => write_counts_csv(&tabulation, io::stdout().lock())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let ratings = dir.path().join("ratings.txt");
        std::fs::write(&ratings, "0 1\n1 1\n2 0\n").unwrap();
        let output = dir.path().join("counts.csv");

        let args = InputArgs {
            input: ratings,
            test: "cohen".to_string(),
            columns: vec![0, 1],
            weights: "linear".to_string(),
        };
        run(&args, Some(output.clone())).unwrap();

        let csv = std::fs::read_to_string(&output).unwrap();
        assert_eq!(csv, "rater1\\rater2,0,1,2\n0,0,1,0\n1,0,1,0\n2,1,0,0\n");
    }

    #[test]
    fn test_counts_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = InputArgs {
            input: dir.path().join("missing.txt"),
            test: "fleiss".to_string(),
            columns: vec![0, 1],
            weights: "linear".to_string(),
        };
        let err = run(&args, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<kappa_stat::Error>(),
            Some(kappa_stat::Error::Load { .. })
        ));
    }
}
