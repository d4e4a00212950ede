//! Everything around the estimators: loading and validating report files, reading analysis
//! configs, scoring estimates against a reference, and writing results.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod config;
pub mod metrics;
mod plot;
mod reports;
mod results;

use anyhow::Result;
use pathest::Trajectory;

pub use self::config::{AnalysisConfig, Pass};
pub use self::reports::{load_csv, load_file, load_json, to_json, validate};
pub use self::results::Results;

/// Runs every configured pass over the input and writes each estimate.
pub fn run_analysis(config: &AnalysisConfig, input: &Trajectory, results: &Results) -> Result<()> {
    for (name, pass) in config.named_passes() {
        let estimate = pass.apply(input)?;
        results.write(&name, &pass.title(), &estimate)?;
    }
    Ok(())
}

/// Predicts the position at `time` from the raw input and from every configured pass.
pub fn query(
    config: &AnalysisConfig,
    input: &Trajectory,
    time: f64,
) -> Vec<(String, Result<(f64, f64)>)> {
    let mut answers = vec![("input".to_string(), input.predict_at(time).map_err(Into::into))];
    for (name, pass) in config.named_passes() {
        let answer = pass
            .apply(input)
            .and_then(|estimate| Ok(estimate.predict_at(time)?));
        answers.push((name, answer));
    }
    answers
}
