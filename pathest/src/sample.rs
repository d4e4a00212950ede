use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One (x, y, t) measurement.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    pub fn cmp_x(a: &Sample, b: &Sample) -> Ordering {
        a.x.total_cmp(&b.x)
    }

    pub fn cmp_y(a: &Sample, b: &Sample) -> Ordering {
        a.y.total_cmp(&b.y)
    }

    pub fn cmp_t(a: &Sample, b: &Sample) -> Ordering {
        a.t.total_cmp(&b.t)
    }

    pub fn dist_to(&self, other: &Sample) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<(f64, f64, f64)> for Sample {
    fn from((x, y, t): (f64, f64, f64)) -> Self {
        Self::new(x, y, t)
    }
}
