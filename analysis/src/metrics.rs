//! Accuracy of an estimate against a reference trajectory. Samples are paired up by their
//! position in time order, so both trajectories must have the same length.

use anyhow::Result;
use pathest::Trajectory;

/// Mean Euclidean distance between paired samples.
pub fn mean_absolute_error(estimate: &Trajectory, reference: &Trajectory) -> Result<f64> {
    let errors = paired_errors(estimate, reference)?;
    Ok(errors.iter().sum::<f64>() / errors.len() as f64)
}

pub fn root_mean_square_error(estimate: &Trajectory, reference: &Trajectory) -> Result<f64> {
    let errors = paired_errors(estimate, reference)?;
    let mean_square = errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64;
    Ok(mean_square.sqrt())
}

/// The mean absolute error, scaled by the mean distance between consecutive reference samples.
pub fn mean_absolute_scaled_error(estimate: &Trajectory, reference: &Trajectory) -> Result<f64> {
    if reference.len() < 2 {
        bail!("Scaled error needs a reference with at least 2 samples");
    }
    let steps = reference.samples().windows(2);
    let mean_step =
        steps.map(|pair| pair[0].dist_to(&pair[1])).sum::<f64>() / (reference.len() - 1) as f64;
    if mean_step == 0.0 {
        bail!("Scaled error is undefined for a reference that never moves");
    }
    Ok(mean_absolute_error(estimate, reference)? / mean_step)
}

fn paired_errors(estimate: &Trajectory, reference: &Trajectory) -> Result<Vec<f64>> {
    if estimate.len() != reference.len() {
        bail!(
            "Estimate has {} samples, but reference has {}",
            estimate.len(),
            reference.len()
        );
    }
    if reference.is_empty() {
        bail!("Can't compare empty trajectories");
    }
    Ok(estimate
        .iter()
        .zip(reference)
        .map(|(a, b)| a.dist_to(b))
        .collect())
}
