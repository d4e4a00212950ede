use serde::{Deserialize, Serialize};

use crate::{Error, KalmanConfig, Predictor, Result, Sample, Smoothing};

/// Samples sorted by time. Samples with equal timestamps keep the order they were added in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct Trajectory {
    // Never decreasing in t
    inner: Vec<Sample>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Sorts the input once by time. The sort is stable, so equal timestamps keep their input
    /// order.
    pub fn from_samples(mut raw: Vec<Sample>) -> Self {
        raw.sort_by(Sample::cmp_t);
        Self { inner: raw }
    }

    pub fn insert(&mut self, sample: Sample) {
        // After every existing sample with the same time
        let idx = self.inner.partition_point(|s| s.t <= sample.t);
        self.inner.insert(idx, sample);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.inner.iter()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.inner
    }

    pub fn min_x(&self) -> Result<f64> {
        self.extreme("min_x", |a, b| Sample::cmp_x(a, b).is_lt()).map(|s| s.x)
    }

    pub fn max_x(&self) -> Result<f64> {
        self.extreme("max_x", |a, b| Sample::cmp_x(a, b).is_gt()).map(|s| s.x)
    }

    pub fn min_y(&self) -> Result<f64> {
        self.extreme("min_y", |a, b| Sample::cmp_y(a, b).is_lt()).map(|s| s.y)
    }

    pub fn max_y(&self) -> Result<f64> {
        self.extreme("max_y", |a, b| Sample::cmp_y(a, b).is_gt()).map(|s| s.y)
    }

    pub fn min_t(&self) -> Result<f64> {
        self.require("min_t", 1)?;
        Ok(self.inner[0].t)
    }

    pub fn max_t(&self) -> Result<f64> {
        self.require("max_t", 1)?;
        Ok(self.inner[self.inner.len() - 1].t)
    }

    /// Mean over consecutive pairs of the distance covered divided by the time elapsed. Pairs
    /// sharing a timestamp are skipped, so at least two distinct timestamps are needed.
    pub fn average_speed(&self) -> Result<f64> {
        self.require("average_speed", 2)?;
        let mut sum = 0.0;
        let mut count = 0;
        for pair in self.inner.windows(2) {
            let dt = pair[1].t - pair[0].t;
            if dt == 0.0 {
                continue;
            }
            sum += pair[0].dist_to(&pair[1]) / dt;
            count += 1;
        }
        if count == 0 {
            return Err(Error::InsufficientData {
                operation: "average_speed",
                required: 2,
                found: 1,
                unit: "distinct timestamps",
            });
        }
        Ok(sum / count as f64)
    }

    /// Estimates the position at any time.
    ///
    /// - Before the first sample, moves backwards from the first sample, away from the second,
    ///   at the average speed.
    /// - After the last sample, moves forwards from the last sample, away from the one before it,
    ///   at the average speed.
    /// - Otherwise, finds the first sample strictly later than `time` and returns the plain
    ///   midpoint between it and the previous sample. The midpoint ignores where `time` falls
    ///   inside the interval. At exactly the last timestamp, the final two samples are used.
    pub fn predict_at(&self, time: f64) -> Result<(f64, f64)> {
        if !time.is_finite() {
            return Err(Error::InvalidParameter {
                name: "time",
                value: time.to_string(),
                reason: "must be finite",
            });
        }
        self.require("predict_at", 2)?;
        let first = self.inner[0];
        let last = self.inner[self.inner.len() - 1];

        if time < first.t {
            let speed = self.average_speed()?;
            return Ok(project(first, self.inner[1], (first.t - time) * speed));
        }
        if time > last.t {
            let speed = self.average_speed()?;
            let before_last = self.inner[self.inner.len() - 2];
            return Ok(project(last, before_last, (time - last.t) * speed));
        }

        let idx = self
            .inner
            .partition_point(|s| s.t <= time)
            .min(self.inner.len() - 1);
        let (s1, s2) = (self.inner[idx - 1], self.inner[idx]);
        Ok(((s1.x + s2.x) / 2.0, (s1.y + s2.y) / 2.0))
    }

    /// Replays every sample in time order through the predictor, collecting the outputs.
    pub fn replay(&self, predictor: &mut dyn Predictor) -> Trajectory {
        let mut output = Trajectory {
            inner: Vec::with_capacity(self.inner.len()),
        };
        for sample in &self.inner {
            output.insert(predictor.predict(*sample));
        }
        output
    }

    /// One smoothing pass through a freshly built predictor.
    pub fn smoothed(&self, smoothing: &Smoothing) -> Result<Trajectory> {
        self.smoothed_repeatedly(smoothing, 1)
    }

    /// Feeds the trajectory through the filter, then feeds that output through a new filter, and
    /// so on, `iterations` times in total. Zero iterations returns a copy.
    pub fn smoothed_repeatedly(
        &self,
        smoothing: &Smoothing,
        iterations: usize,
    ) -> Result<Trajectory> {
        smoothing.validate()?;
        self.require("smoothing", 1)?;

        let mut current = self.clone();
        for _ in 0..iterations {
            let mut predictor = smoothing.predictor()?;
            current = current.replay(predictor.as_mut());
        }
        debug!(
            "Smoothed {} samples with {}, {} time(s)",
            self.len(),
            smoothing.describe(),
            iterations
        );
        Ok(current)
    }

    pub fn smooth_with_window(&self, window: usize) -> Result<Trajectory> {
        self.smoothed(&Smoothing::WindowAverage { window })
    }

    pub fn smooth_with_factor(&self, factor: f64) -> Result<Trajectory> {
        self.smoothed(&Smoothing::Exponential { factor })
    }

    pub fn smooth_with_kalman(&self) -> Result<Trajectory> {
        self.smoothed(&Smoothing::Kalman(KalmanConfig::default()))
    }

    /// Smooths the whole trajectory, then predicts on the result.
    pub fn predict_smoothed_at(&self, smoothing: &Smoothing, time: f64) -> Result<(f64, f64)> {
        smoothing.validate()?;
        self.require("predict_at", 2)?;
        self.smoothed(smoothing)?.predict_at(time)
    }

    pub fn predict_with_window_at(&self, window: usize, time: f64) -> Result<(f64, f64)> {
        self.predict_smoothed_at(&Smoothing::WindowAverage { window }, time)
    }

    pub fn predict_with_factor_at(&self, factor: f64, time: f64) -> Result<(f64, f64)> {
        self.predict_smoothed_at(&Smoothing::Exponential { factor }, time)
    }

    pub fn predict_with_kalman_at(&self, time: f64) -> Result<(f64, f64)> {
        self.predict_smoothed_at(&Smoothing::Kalman(KalmanConfig::default()), time)
    }

    fn require(&self, operation: &'static str, required: usize) -> Result<()> {
        if self.inner.len() < required {
            return Err(Error::too_few_samples(operation, required, self.inner.len()));
        }
        Ok(())
    }

    fn extreme<F: Fn(&Sample, &Sample) -> bool>(
        &self,
        operation: &'static str,
        better: F,
    ) -> Result<Sample> {
        self.require(operation, 1)?;
        let mut best = self.inner[0];
        for sample in &self.inner[1..] {
            if better(sample, &best) {
                best = *sample;
            }
        }
        Ok(best)
    }
}

// Moves `from` by `distance`, directly away from `toward`. If both points coincide there's no
// direction to move in.
fn project(from: Sample, toward: Sample, distance: f64) -> (f64, f64) {
    let len = from.dist_to(&toward);
    if len == 0.0 {
        return (from.x, from.y);
    }
    let dx = (toward.x - from.x) / len;
    let dy = (toward.y - from.y) / len;
    (from.x - distance * dx, from.y - distance * dy)
}

impl From<Vec<Sample>> for Trajectory {
    fn from(raw: Vec<Sample>) -> Self {
        Self::from_samples(raw)
    }
}

impl From<Trajectory> for Vec<Sample> {
    fn from(trajectory: Trajectory) -> Self {
        trajectory.inner
    }
}

impl FromIterator<Sample> for Trajectory {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::from_samples(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(pts: &[(f64, f64, f64)]) -> Trajectory {
        pts.iter().map(|pt| Sample::from(*pt)).collect()
    }

    fn close(actual: (f64, f64), expected: (f64, f64)) -> bool {
        (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9
    }

    fn line() -> Trajectory {
        trajectory(&[(0.0, 0.0, 0.0), (2.0, 0.0, 1.0), (4.0, 0.0, 2.0)])
    }

    #[test]
    fn test_insert_keeps_sorted() {
        let mut t = Trajectory::new();
        // Deterministic but scrambled times
        for i in 0..50 {
            let time = ((i * 37) % 11) as f64;
            t.insert(Sample::new(i as f64, 0.0, time));
        }
        assert_eq!(t.len(), 50);
        for pair in t.samples().windows(2) {
            assert!(pair[0].t <= pair[1].t);
        }
    }

    #[test]
    fn test_equal_times_keep_insertion_order() {
        let mut t = trajectory(&[(0.0, 0.0, 1.0), (1.0, 0.0, 2.0)]);
        t.insert(Sample::new(5.0, 0.0, 1.0));
        t.insert(Sample::new(6.0, 0.0, 1.0));
        t.insert(Sample::new(-1.0, 0.0, 0.0));
        let xs: Vec<f64> = t.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![-1.0, 0.0, 5.0, 6.0, 1.0]);
    }

    #[test]
    fn test_construction_sorts_stably() {
        let t = trajectory(&[(1.0, 0.0, 3.0), (2.0, 0.0, 1.0), (3.0, 0.0, 3.0), (4.0, 0.0, 0.0)]);
        let xs: Vec<f64> = t.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![4.0, 2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_bounds() {
        let t = trajectory(&[(3.0, -1.0, 5.0), (-2.0, 4.0, 1.0), (0.0, 2.0, 9.0)]);
        assert_eq!(t.min_x().unwrap(), -2.0);
        assert_eq!(t.max_x().unwrap(), 3.0);
        assert_eq!(t.min_y().unwrap(), -1.0);
        assert_eq!(t.max_y().unwrap(), 4.0);
        assert_eq!(t.min_t().unwrap(), 1.0);
        assert_eq!(t.max_t().unwrap(), 9.0);
    }

    #[test]
    fn test_bounds_on_empty() {
        let t = Trajectory::new();
        for result in [t.min_x(), t.max_x(), t.min_y(), t.max_y(), t.min_t(), t.max_t()] {
            assert!(matches!(
                result,
                Err(Error::InsufficientData {
                    required: 1,
                    found: 0,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_average_speed() {
        let t = trajectory(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]);
        assert!((t.average_speed().unwrap() - 1.0).abs() < 1e-12);

        // Consecutive pairs: 3-4-5 in 1s, then 0 in 2s, and the equal-time pair is skipped
        let t = trajectory(&[(0.0, 0.0, 0.0), (3.0, 4.0, 1.0), (3.0, 4.0, 3.0), (9.0, 9.0, 3.0)]);
        assert!((t.average_speed().unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_average_speed_needs_two_times() {
        let t = trajectory(&[(0.0, 0.0, 1.0), (5.0, 5.0, 1.0)]);
        assert!(matches!(
            t.average_speed(),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_too_little_data() {
        for t in [Trajectory::new(), trajectory(&[(1.0, 1.0, 1.0)])] {
            assert!(matches!(
                t.predict_at(0.5),
                Err(Error::InsufficientData { required: 2, .. })
            ));
            assert!(matches!(
                t.average_speed(),
                Err(Error::InsufficientData { required: 2, .. })
            ));
            assert!(t.predict_with_kalman_at(0.5).is_err());
        }
    }

    #[test]
    fn test_midpoint_rule() {
        let t = trajectory(&[(0.0, 0.0, 0.0), (10.0, 10.0, 10.0)]);
        assert!(close(t.predict_at(5.0).unwrap(), (5.0, 5.0)));
        // Not weighted by time
        assert!(close(t.predict_at(1.0).unwrap(), (5.0, 5.0)));
        assert!(close(t.predict_at(0.0).unwrap(), (5.0, 5.0)));
        assert!(close(t.predict_at(10.0).unwrap(), (5.0, 5.0)));
    }

    #[test]
    fn test_midpoint_picks_straddling_pair() {
        let t = trajectory(&[(0.0, 0.0, 0.0), (2.0, 0.0, 1.0), (4.0, 6.0, 2.0)]);
        assert!(close(t.predict_at(0.5).unwrap(), (1.0, 0.0)));
        // Exactly on a sample uses the next interval
        assert!(close(t.predict_at(1.0).unwrap(), (3.0, 3.0)));
        assert!(close(t.predict_at(1.9).unwrap(), (3.0, 3.0)));
        assert!(close(t.predict_at(2.0).unwrap(), (3.0, 3.0)));
    }

    #[test]
    fn test_extrapolate_backwards() {
        let t = trajectory(&[(0.0, 0.0, 0.0), (3.0, 4.0, 1.0)]);
        // Speed 5, heading (0.6, 0.8); 2 time units before the start
        assert!(close(t.predict_at(-2.0).unwrap(), (-6.0, -8.0)));
    }

    #[test]
    fn test_extrapolate_forwards() {
        let t = trajectory(&[(0.0, 0.0, 0.0), (2.0, 0.0, 1.0), (4.0, 0.0, 2.0)]);
        assert!(close(t.predict_at(5.0).unwrap(), (10.0, 0.0)));

        let t = trajectory(&[(0.0, 0.0, 0.0), (0.0, 10.0, 10.0)]);
        assert!(close(t.predict_at(15.0).unwrap(), (0.0, 15.0)));
    }

    #[test]
    fn test_extrapolate_without_direction() {
        let t = trajectory(&[(1.0, 1.0, 0.0), (1.0, 1.0, 1.0), (4.0, 5.0, 2.0)]);
        assert!(close(t.predict_at(-3.0).unwrap(), (1.0, 1.0)));
    }

    #[test]
    fn test_smoothing_preserves_length() {
        let t = trajectory(&[
            (0.0, 1.0, 0.0),
            (1.0, 3.0, 0.5),
            (2.0, 2.0, 1.5),
            (3.0, 5.0, 1.5),
            (4.0, 4.0, 4.0),
        ]);
        for smoothing in [
            Smoothing::WindowAverage { window: 3 },
            Smoothing::Exponential { factor: 0.3 },
            Smoothing::Kalman(KalmanConfig::default()),
        ] {
            for iterations in 0..4 {
                let out = t.smoothed_repeatedly(&smoothing, iterations).unwrap();
                assert_eq!(out.len(), t.len());
                let times: Vec<f64> = out.iter().map(|s| s.t).collect();
                let expected: Vec<f64> = t.iter().map(|s| s.t).collect();
                assert_eq!(times, expected);
            }
        }
    }

    #[test]
    fn test_predict_at_rejects_non_finite_time() {
        for time in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                line().predict_at(time),
                Err(Error::InvalidParameter { name: "time", .. })
            ));
        }
    }

    #[test]
    fn test_window_larger_than_trajectory() {
        let out = line().smooth_with_window(1 << 40).unwrap();
        let xs: Vec<f64> = out.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_smooth_examples() {
        let out = line().smooth_with_window(2).unwrap();
        assert_eq!(out, trajectory(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (3.0, 0.0, 2.0)]));

        let out = line().smooth_with_factor(0.5).unwrap();
        assert_eq!(out, trajectory(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (2.5, 0.0, 2.0)]));
    }

    #[test]
    fn test_repeated_smoothing() {
        // Second pass of window 2 over [0, 1, 3]
        let out = line()
            .smoothed_repeatedly(&Smoothing::WindowAverage { window: 2 }, 2)
            .unwrap();
        let xs: Vec<f64> = out.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![0.0, 0.5, 2.0]);
    }

    #[test]
    fn test_invalid_smoothing_parameters() {
        assert!(matches!(
            line().smooth_with_window(0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            line().smooth_with_factor(0.0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            line().predict_with_factor_at(1.5, 1.0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            Trajectory::new().smooth_with_kalman(),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_predict_smoothed() {
        let t = line();
        // Smoothed with window 2: [(0,0,0), (1,0,1), (3,0,2)]
        assert!(close(t.predict_with_window_at(2, 0.5).unwrap(), (0.5, 0.0)));
        // Smoothed with 0.5: [(0,0,0), (1,0,1), (2.5,0,2)]
        assert!(close(t.predict_with_factor_at(0.5, 1.5).unwrap(), (1.75, 0.0)));
        assert!(t.predict_with_kalman_at(1.0).is_ok());
    }

    #[test]
    fn test_serde_sorts() {
        let t: Trajectory = serde_json::from_str(
            r#"[{"x": 1.0, "y": 0.0, "t": 2.0}, {"x": 0.0, "y": 0.0, "t": 1.0}]"#,
        )
        .unwrap();
        assert_eq!(t.min_t().unwrap(), 1.0);
        assert_eq!(t.samples()[0].x, 0.0);
    }
}
