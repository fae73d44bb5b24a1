//! Single-pass temperature statistics.
//!
//! [`PixelStats`] accumulates `{count, min, max, sum}` (and
//! second moments) in O(1) memory regardless of pixel count,
//! so an export never has to materialize the converted grid.
//! [`RunStatistics`] is the immutable snapshot taken at the
//! end of the pass; finalizing consumes the accumulator, so
//! nothing can be observed into it afterwards.

use std::ops::AddAssign;

use serde_derive::*;

/// Running accumulator over converted celsius values.
///
/// Values go in with `stats += temp` (or [`observe`]);
/// accumulators from parallel image workers merge with
/// `stats += &other`. Skipped pixels are counted separately
/// and excluded from every moment.
///
/// [`observe`]: PixelStats::observe
#[derive(Debug, Clone, PartialEq)]
pub struct PixelStats {
    count: u64,
    skipped: u64,
    min: f64,
    max: f64,
    sum: f64,
    sum_sq: f64,
}

impl Default for PixelStats {
    fn default() -> Self {
        PixelStats {
            count: 0,
            skipped: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.,
            sum_sq: 0.,
        }
    }
}

impl PixelStats {
    /// Fold one converted temperature into the running
    /// moments. O(1) time and memory.
    pub fn observe(&mut self, temp: f64) {
        self.count += 1;
        self.min = self.min.min(temp);
        self.max = self.max.max(temp);
        self.sum += temp;
        self.sum_sq += temp * temp;
    }

    /// Record a pixel whose conversion failed. Skipped
    /// pixels never touch min/max/sum.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Snapshot the finalized statistics.
    ///
    /// The mean is the running sum divided by the count at
    /// the end of the pass, never an incrementally updated
    /// average. Consumes the accumulator: nothing can be
    /// observed after finalizing.
    pub fn finalize(self) -> RunStatistics {
        if self.count == 0 {
            return RunStatistics {
                count: 0,
                skipped: self.skipped,
                min: None,
                max: None,
                average: None,
                range: None,
                std_dev: None,
            };
        }

        let n = self.count as f64;
        let average = self.sum / n;
        let variance = (self.sum_sq / n - average * average).max(0.);
        RunStatistics {
            count: self.count,
            skipped: self.skipped,
            min: Some(self.min),
            max: Some(self.max),
            average: Some(average),
            range: Some(self.max - self.min),
            std_dev: Some(variance.sqrt()),
        }
    }
}

impl AddAssign<f64> for PixelStats {
    fn add_assign(&mut self, temp: f64) {
        self.observe(temp);
    }
}

impl AddAssign<&PixelStats> for PixelStats {
    fn add_assign(&mut self, other: &PixelStats) {
        self.count += other.count;
        self.skipped += other.skipped;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }
}

/// Finalized statistics of one conversion run.
///
/// The per-value fields are `None` (JSON `null`) when no
/// pixel was observed; an all-skipped grid reports "no data"
/// explicitly rather than a NaN average.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub count: u64,
    pub skipped: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub range: Option<f64>,
    pub std_dev: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moments_over_a_small_sequence() {
        let mut stats = PixelStats::default();
        for temp in [20.0, 20.5, 21.0, 21.5].iter() {
            stats += *temp;
        }
        let stats = stats.finalize();

        assert_eq!(stats.count, 4);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.min, Some(20.0));
        assert_eq!(stats.max, Some(21.5));
        assert_eq!(stats.average, Some(20.75));
        assert_eq!(stats.range, Some(1.5));
        let std_dev = stats.std_dev.unwrap();
        assert!((std_dev - 0.559016994374947).abs() < 1e-12);
    }

    #[test]
    fn empty_accumulator_reports_no_data() {
        let stats = PixelStats::default().finalize();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.average, None);
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn all_skipped_still_reports_no_data() {
        let mut stats = PixelStats::default();
        for _ in 0..7 {
            stats.skip();
        }
        let stats = stats.finalize();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.skipped, 7);
        assert_eq!(stats.average, None);
    }

    #[test]
    fn skipped_pixels_do_not_move_the_moments() {
        let mut stats = PixelStats::default();
        stats += 10.;
        stats.skip();
        stats += 20.;
        let stats = stats.finalize();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.average, Some(15.));
    }

    #[test]
    fn merging_matches_a_single_pass() {
        let temps = [18.2, 19.9, 25.1, 31.7, 22.4, 20.0];

        let mut whole = PixelStats::default();
        for t in temps.iter() {
            whole += *t;
        }

        let (left, right) = temps.split_at(2);
        let mut a = PixelStats::default();
        for t in left.iter() {
            a += *t;
        }
        let mut b = PixelStats::default();
        for t in right.iter() {
            b += *t;
        }
        b.skip();
        a += &b;

        assert_eq!(a.count(), whole.count());
        assert_eq!(a.skipped(), 1);
        let (a, whole) = (a.finalize(), whole.finalize());
        assert_eq!(a.min, whole.min);
        assert_eq!(a.max, whole.max);
        assert_eq!(a.average, whole.average);
    }

    #[test]
    fn no_data_serializes_as_null() {
        let json = serde_json::to_string(&PixelStats::default().finalize()).unwrap();
        assert!(json.contains("\"min\":null"));
        assert!(json.contains("\"average\":null"));
    }
}
