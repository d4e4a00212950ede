//! Online filters that turn each raw sample into a smoothed one.
//!
//! Every filter carries private running state that changes on each call, so one instance must
//! only ever see one pass over one trajectory.

mod exponential;
mod kalman;
mod window;

use crate::{Result, Sample};

pub use self::exponential::ExponentialSmoother;
pub use self::kalman::{KalmanConfig, KalmanEstimator};
pub use self::window::WindowAverage;

pub trait Predictor {
    /// Feeds the next sample in time order and returns the filtered estimate, carrying the
    /// input's timestamp.
    fn predict(&mut self, sample: Sample) -> Sample;
}

/// Selects one of the filters along with its parameters. Build a fresh predictor for every pass
/// with [`Smoothing::predictor`].
#[derive(Clone, Debug, PartialEq)]
pub enum Smoothing {
    WindowAverage { window: usize },
    Exponential { factor: f64 },
    Kalman(KalmanConfig),
}

impl Smoothing {
    /// Checks parameters, so invalid ones fail before any data is touched.
    pub fn validate(&self) -> Result<()> {
        match self {
            Smoothing::WindowAverage { window } => WindowAverage::check_window(*window),
            Smoothing::Exponential { factor } => ExponentialSmoother::check_factor(*factor),
            Smoothing::Kalman(_) => Ok(()),
        }
    }

    pub fn predictor(&self) -> Result<Box<dyn Predictor>> {
        let predictor: Box<dyn Predictor> = match self {
            Smoothing::WindowAverage { window } => Box::new(WindowAverage::new(*window)?),
            Smoothing::Exponential { factor } => Box::new(ExponentialSmoother::new(*factor)?),
            Smoothing::Kalman(config) => Box::new(KalmanEstimator::new(config.clone())),
        };
        Ok(predictor)
    }

    pub fn describe(&self) -> String {
        match self {
            Smoothing::WindowAverage { window } => format!("window average over {window} samples"),
            Smoothing::Exponential { factor } => format!("exponential smoothing with {factor}"),
            Smoothing::Kalman(_) => "Kalman filter".to_string(),
        }
    }
}
