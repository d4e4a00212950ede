use crate::{Error, Predictor, Result, Sample};

/// Exponentially weighted running estimate:
///
/// ```text
/// S_1 = x_1
/// S_t = α x_t + (1 - α) S_{t-1}
/// ```
///
/// applied to x and y independently.
#[derive(Clone, Debug)]
pub struct ExponentialSmoother {
    factor: f64,
    // None until the first sample seeds it
    estimate: Option<(f64, f64)>,
}

impl ExponentialSmoother {
    /// `factor` must lie strictly between 0 and 1.
    pub fn new(factor: f64) -> Result<Self> {
        Self::check_factor(factor)?;
        Ok(Self::unchecked(factor))
    }

    pub(crate) fn check_factor(factor: f64) -> Result<()> {
        if !Self::valid_factor(factor) {
            return Err(Error::InvalidParameter {
                name: "smoothing factor",
                value: factor.to_string(),
                reason: "must be strictly between 0 and 1",
            });
        }
        Ok(())
    }

    /// Skips validation. With a factor outside (0, 1), every call to `predict` returns its input
    /// unchanged.
    pub fn unchecked(factor: f64) -> Self {
        Self {
            factor,
            estimate: None,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    fn valid_factor(factor: f64) -> bool {
        factor > 0.0 && factor < 1.0
    }

    fn blend(&self, raw: f64, previous: f64) -> f64 {
        self.factor * raw + (1.0 - self.factor) * previous
    }
}

impl Predictor for ExponentialSmoother {
    fn predict(&mut self, sample: Sample) -> Sample {
        if !Self::valid_factor(self.factor) {
            return sample;
        }

        let (x, y) = match self.estimate {
            None => (sample.x, sample.y),
            Some((prev_x, prev_y)) => (self.blend(sample.x, prev_x), self.blend(sample.y, prev_y)),
        };
        self.estimate = Some((x, y));
        Sample::new(x, y, sample.t)
    }
}
