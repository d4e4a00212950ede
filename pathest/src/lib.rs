//! Trajectory estimation from noisy, irregularly timed 2D position samples.
//!
//! A [`Trajectory`] keeps its samples sorted by time and answers point-in-time position queries.
//! Smoothing replays a trajectory through one of three online filters, each implementing
//! [`Predictor`]: a windowed moving average, exponential smoothing, and a constant-velocity
//! Kalman filter.

#[macro_use]
extern crate log;

mod error;
pub mod predictor;
mod sample;
mod trajectory;

pub use self::error::{Error, Result};
pub use self::predictor::{
    ExponentialSmoother, KalmanConfig, KalmanEstimator, Predictor, Smoothing, WindowAverage,
};
pub use self::sample::Sample;
pub use self::trajectory::Trajectory;
