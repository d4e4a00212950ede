use crate::{Error, Predictor, Result, Sample};

/// Mean of the last `window` samples. Until the window fills up, the mean is over however many
/// samples have been seen, so early outputs lean towards the first samples.
#[derive(Clone, Debug)]
pub struct WindowAverage {
    window: usize,
    // Circular buffer of (x, y). Grows one sample at a time until it holds `window` of them.
    history: Vec<(f64, f64)>,
    next_slot: usize,
    sum_x: f64,
    sum_y: f64,
}

impl WindowAverage {
    pub fn new(window: usize) -> Result<Self> {
        Self::check_window(window)?;
        Ok(Self {
            window,
            history: Vec::new(),
            next_slot: 0,
            sum_x: 0.0,
            sum_y: 0.0,
        })
    }

    pub(crate) fn check_window(window: usize) -> Result<()> {
        if window == 0 {
            return Err(Error::InvalidParameter {
                name: "window size",
                value: window.to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Predictor for WindowAverage {
    fn predict(&mut self, sample: Sample) -> Sample {
        if self.history.len() < self.window {
            self.history.push((sample.x, sample.y));
        } else {
            let (old_x, old_y) = self.history[self.next_slot];
            self.sum_x -= old_x;
            self.sum_y -= old_y;
            self.history[self.next_slot] = (sample.x, sample.y);
        }
        self.sum_x += sample.x;
        self.sum_y += sample.y;
        self.next_slot = (self.next_slot + 1) % self.window;

        let denominator = self.history.len() as f64;
        Sample::new(self.sum_x / denominator, self.sum_y / denominator, sample.t)
    }
}
