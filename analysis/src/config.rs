use anyhow::Result;
use pathest::{ExponentialSmoother, KalmanConfig, Smoothing, Trajectory};
use serde::Deserialize;

/// Which estimates to compute, in order: every moving average, then every exponential
/// smoothing, then optionally the Kalman filter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisConfig {
    pub passes: Vec<Pass>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Pass {
    MovingAverage { iterations: usize, samples: usize },
    /// `smoothing` lies in [0, 1]. The endpoints pass the input through unchanged.
    Exponential { iterations: usize, smoothing: f64 },
    Kalman,
}

impl AnalysisConfig {
    pub fn load(path: &str) -> Result<Self> {
        let file = fs_err::File::open(path)?;
        Self::from_json(std::io::BufReader::new(file))
    }

    /// Entries with a non-positive iteration count or an out-of-range parameter are skipped with
    /// a warning, rather than failing the whole config.
    pub fn from_json<R: std::io::Read>(reader: R) -> Result<Self> {
        let raw: RawConfig = serde_json::from_reader(reader)?;
        let mut passes = Vec::new();

        for entry in raw.sma {
            if entry.iterations > 0 && entry.samples > 0 {
                passes.push(Pass::MovingAverage {
                    iterations: entry.iterations as usize,
                    samples: entry.samples as usize,
                });
            } else {
                warn!(
                    "Skipping moving average with {} iteration(s) and {} sample(s)",
                    entry.iterations, entry.samples
                );
            }
        }

        for entry in raw.es {
            if entry.iterations > 0 && (0.0..=1.0).contains(&entry.smoothing) {
                passes.push(Pass::Exponential {
                    iterations: entry.iterations as usize,
                    smoothing: entry.smoothing,
                });
            } else {
                warn!(
                    "Skipping exponential smoothing with {} iteration(s) and factor {}",
                    entry.iterations, entry.smoothing
                );
            }
        }

        if raw.kf {
            passes.push(Pass::Kalman);
        }

        Ok(Self { passes })
    }

    /// Pairs each pass with its output name: `out-sma-<i>`, `out-es-<i>`, `out-kf`, numbering
    /// each kind separately.
    pub fn named_passes(&self) -> Vec<(String, &Pass)> {
        let mut sma = 0;
        let mut es = 0;
        let mut result = Vec::new();
        for pass in &self.passes {
            let name = match pass {
                Pass::MovingAverage { .. } => {
                    sma += 1;
                    format!("out-sma-{}", sma - 1)
                }
                Pass::Exponential { .. } => {
                    es += 1;
                    format!("out-es-{}", es - 1)
                }
                Pass::Kalman => "out-kf".to_string(),
            };
            result.push((name, pass));
        }
        result
    }
}

impl Pass {
    pub fn title(&self) -> String {
        match self {
            Pass::MovingAverage {
                iterations,
                samples,
            } => format!(
                "Simple moving average with {iterations} iteration(s) and {samples} sample(s)"
            ),
            Pass::Exponential {
                iterations,
                smoothing,
            } => format!(
                "Exponential smoothing with {iterations} iteration(s) and smoothing factor \
                 {smoothing:.4}"
            ),
            Pass::Kalman => "Kalman filter".to_string(),
        }
    }

    pub fn apply(&self, input: &Trajectory) -> Result<Trajectory> {
        match self {
            Pass::MovingAverage {
                iterations,
                samples,
            } => Ok(input
                .smoothed_repeatedly(&Smoothing::WindowAverage { window: *samples }, *iterations)?),
            Pass::Exponential {
                iterations,
                smoothing,
            } => {
                if *smoothing > 0.0 && *smoothing < 1.0 {
                    return Ok(input.smoothed_repeatedly(
                        &Smoothing::Exponential { factor: *smoothing },
                        *iterations,
                    )?);
                }
                info!("Smoothing factor {smoothing} leaves the input unchanged");
                let mut current = input.clone();
                for _ in 0..*iterations {
                    current = current.replay(&mut ExponentialSmoother::unchecked(*smoothing));
                }
                Ok(current)
            }
            Pass::Kalman => Ok(input.smoothed(&Smoothing::Kalman(KalmanConfig::default()))?),
        }
    }
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    sma: Vec<RawMovingAverage>,
    #[serde(default)]
    es: Vec<RawExponential>,
    #[serde(default)]
    kf: bool,
}

#[derive(Deserialize)]
struct RawMovingAverage {
    #[serde(default)]
    iterations: i64,
    #[serde(default)]
    samples: i64,
}

#[derive(Deserialize)]
struct RawExponential {
    #[serde(default)]
    iterations: i64,
    #[serde(default = "missing_smoothing")]
    smoothing: f64,
}

fn missing_smoothing() -> f64 {
    -1.0
}
