use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2, Vector4};

use crate::{Error, Predictor, Result, Sample};

/// The fixed matrices of a linear Kalman filter over the state `[x, y, u, v]`, where `u` and `v`
/// act as velocity terms. Only x and y are observed. Built through [`KalmanConfig::new`], which
/// checks the measurement noise, or [`KalmanConfig::constant_velocity`].
#[derive(Clone, Debug, PartialEq)]
pub struct KalmanConfig {
    transition: Matrix4<f64>,
    measurement: Matrix2x4<f64>,
    process_noise: Matrix4<f64>,
    measurement_noise: Matrix2<f64>,
}

impl KalmanConfig {
    pub fn new(
        transition: Matrix4<f64>,
        measurement: Matrix2x4<f64>,
        process_noise: Matrix4<f64>,
        measurement_noise: Matrix2<f64>,
    ) -> Result<Self> {
        let symmetric = (measurement_noise - measurement_noise.transpose()).amax() <= 1e-12;
        if !symmetric || measurement_noise.cholesky().is_none() {
            return Err(Error::InvalidParameter {
                name: "measurement noise",
                value: format!("{:?}", measurement_noise.as_slice()),
                reason: "must be symmetric positive definite",
            });
        }
        Ok(Self {
            transition,
            measurement,
            process_noise,
            measurement_noise,
        })
    }

    /// A constant-velocity model that advances position by `dt` times the velocity terms on every
    /// step, ignoring the real spacing between samples.
    pub fn constant_velocity(dt: f64) -> Self {
        let mut transition = Matrix4::identity();
        transition[(0, 2)] = dt;
        transition[(1, 3)] = dt;
        Self {
            transition,
            measurement: Matrix2x4::new(
                1.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 1.0,
            ),
            process_noise: Matrix4::from_diagonal(&Vector4::new(0.0, 0.0, 0.1, 0.1)),
            measurement_noise: Matrix2::identity() * 0.1,
        }
    }
}

impl KalmanConfig {
    pub fn transition(&self) -> &Matrix4<f64> {
        &self.transition
    }

    pub fn measurement(&self) -> &Matrix2x4<f64> {
        &self.measurement
    }

    pub fn process_noise(&self) -> &Matrix4<f64> {
        &self.process_noise
    }

    pub fn measurement_noise(&self) -> &Matrix2<f64> {
        &self.measurement_noise
    }
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self::constant_velocity(0.2)
    }
}

/// Discrete linear Kalman filter. The state and covariance both start at zero, so the first few
/// estimates are pulled strongly towards the origin.
///
/// Each call is one step of the model regardless of the sample's timestamp, so sparse or
/// irregular input degrades the estimate.
#[derive(Clone, Debug)]
pub struct KalmanEstimator {
    config: KalmanConfig,
    state: Vector4<f64>,
    covariance: Matrix4<f64>,
}

impl KalmanEstimator {
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            config,
            state: Vector4::zeros(),
            covariance: Matrix4::zeros(),
        }
    }

    pub fn state(&self) -> &Vector4<f64> {
        &self.state
    }

    pub fn covariance(&self) -> &Matrix4<f64> {
        &self.covariance
    }
}

impl Default for KalmanEstimator {
    fn default() -> Self {
        Self::new(KalmanConfig::default())
    }
}

impl Predictor for KalmanEstimator {
    fn predict(&mut self, sample: Sample) -> Sample {
        let a = &self.config.transition;
        let h = &self.config.measurement;

        // Time update
        self.state = a * self.state;
        self.covariance = a * self.covariance * a.transpose() + self.config.process_noise;

        // Measurement update. The gain K solves K * S = P * H^T, or equivalently
        // S^T * K^T = (P * H^T)^T.
        let innovation_cov = h * self.covariance * h.transpose() + self.config.measurement_noise;
        let cross = self.covariance * h.transpose();
        match innovation_cov.transpose().lu().solve(&cross.transpose()) {
            Some(gain_t) => {
                let gain = gain_t.transpose();
                let residual = Vector2::new(sample.x, sample.y) - h * self.state;
                self.state += gain * residual;
                self.covariance = (Matrix4::identity() - gain * h) * self.covariance;
            }
            None => {
                warn!(
                    "Singular innovation covariance at t={}, keeping the time update only",
                    sample.t
                );
            }
        }

        Sample::new(self.state[0], self.state[1], sample.t)
    }
}
