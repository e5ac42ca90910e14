//! Descriptive statistics backing the `summarize` command.
//!
//! Both entry points take a clean numeric slice: missing values are
//! dropped upstream, so `values.len()` is the observation count. An
//! empty slice yields `obs == 0` with every statistic missing (NaN).

/// Five-number summary for the default one-line-per-variable table.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicSummary {
    pub obs: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Full summary for `summarize, detail`.
///
/// `smallest` and `largest` hold up to four values each, in ascending
/// order. Percentiles other than the median use the "higher"
/// interpolation rule; the median interpolates linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSummary {
    pub obs: usize,
    pub p1: f64,
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub smallest: Vec<f64>,
    pub largest: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

/// Computes observation count, mean, sample standard deviation, min
/// and max. A single observation has no standard deviation (NaN).
pub fn basic(values: &[f64]) -> BasicSummary {
    if values.is_empty() {
        return BasicSummary {
            obs: 0,
            mean: f64::NAN,
            std_dev: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    BasicSummary {
        obs: values.len(),
        mean,
        std_dev: (ss / (n - 1.0)).sqrt(),
        min: values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        max: values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
    }
}

/// Computes the detail summary: nine percentiles, the four extreme
/// values at each end, and the first four moments.
pub fn detail(values: &[f64]) -> DetailSummary {
    if values.is_empty() {
        return DetailSummary {
            obs: 0,
            p1: f64::NAN,
            p5: f64::NAN,
            p10: f64::NAN,
            p25: f64::NAN,
            p50: f64::NAN,
            p75: f64::NAN,
            p90: f64::NAN,
            p95: f64::NAN,
            p99: f64::NAN,
            smallest: Vec::new(),
            largest: Vec::new(),
            mean: f64::NAN,
            std_dev: f64::NAN,
            variance: f64::NAN,
            skewness: f64::NAN,
            kurtosis: f64::NAN,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let tail = sorted.len().min(4);

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let m2 = central_moment(values, mean, 2);
    let m3 = central_moment(values, mean, 3);
    let m4 = central_moment(values, mean, 4);
    let variance = m2 * n / (n - 1.0);

    DetailSummary {
        obs: values.len(),
        p1: percentile_higher(&sorted, 1.0),
        p5: percentile_higher(&sorted, 5.0),
        p10: percentile_higher(&sorted, 10.0),
        p25: percentile_higher(&sorted, 25.0),
        p50: percentile_linear(&sorted, 50.0),
        p75: percentile_higher(&sorted, 75.0),
        p90: percentile_higher(&sorted, 90.0),
        p95: percentile_higher(&sorted, 95.0),
        p99: percentile_higher(&sorted, 99.0),
        smallest: sorted[..tail].to_vec(),
        largest: sorted[sorted.len() - tail..].to_vec(),
        mean,
        std_dev: variance.sqrt(),
        variance,
        skewness: m3 / m2.powf(1.5),
        kurtosis: m4 / (m2 * m2),
    }
}

fn central_moment(values: &[f64], mean: f64, order: i32) -> f64 {
    values.iter().map(|v| (v - mean).powi(order)).sum::<f64>() / values.len() as f64
}

// Percentile rank against a sorted slice. The "higher" rule takes the
// value at the rank rounded up; the linear rule interpolates between
// the two bracketing values.
fn percentile_higher(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * p / 100.0;
    sorted[rank.ceil() as usize]
}

fn percentile_linear(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * p / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn basic_five_numbers() {
        let s = basic(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(s.obs, 5);
        assert!(approx(s.mean, 3.0));
        assert!(approx(s.std_dev, 2.5f64.sqrt()));
        assert!(approx(s.min, 1.0));
        assert!(approx(s.max, 5.0));
    }

    #[test]
    fn basic_empty_is_all_missing() {
        let s = basic(&[]);
        assert_eq!(s.obs, 0);
        assert!(s.mean.is_nan());
        assert!(s.std_dev.is_nan());
        assert!(s.min.is_nan());
        assert!(s.max.is_nan());
    }

    #[test]
    fn basic_single_observation_has_no_std_dev() {
        let s = basic(&[7.5]);
        assert_eq!(s.obs, 1);
        assert!(approx(s.mean, 7.5));
        assert!(s.std_dev.is_nan());
        assert!(approx(s.min, 7.5));
        assert!(approx(s.max, 7.5));
    }

    #[test]
    fn percentiles_use_higher_rule_except_median() {
        let v: Vec<f64> = (1..=10).map(|i| (i * 10) as f64).collect();
        let d = detail(&v);
        assert!(approx(d.p1, 20.0));
        assert!(approx(d.p5, 20.0));
        assert!(approx(d.p10, 20.0));
        assert!(approx(d.p25, 40.0));
        assert!(approx(d.p50, 55.0));
        assert!(approx(d.p75, 80.0));
        assert!(approx(d.p90, 100.0));
        assert!(approx(d.p95, 100.0));
        assert!(approx(d.p99, 100.0));
    }

    #[test]
    fn median_interpolates_linearly() {
        let d = detail(&[1.0, 2.0, 3.0, 4.0]);
        assert!(approx(d.p50, 2.5));
        assert!(approx(d.p25, 2.0));
        assert!(approx(d.p75, 4.0));
    }

    #[test]
    fn extremes_take_four_from_each_end() {
        let v: Vec<f64> = (1..=10).map(|i| (i * 10) as f64).collect();
        let d = detail(&v);
        assert_eq!(d.smallest, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(d.largest, vec![70.0, 80.0, 90.0, 100.0]);
    }

    #[test]
    fn extremes_shrink_below_four_observations() {
        let d = detail(&[3.0, 1.0, 2.0]);
        assert_eq!(d.smallest, vec![1.0, 2.0, 3.0]);
        assert_eq!(d.largest, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn moments_of_symmetric_data() {
        let d = detail(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(approx(d.variance, 2.5));
        assert!(approx(d.std_dev, 2.5f64.sqrt()));
        assert!(approx(d.skewness, 0.0));
        assert!(approx(d.kurtosis, 1.7));
    }

    #[test]
    fn skewness_sign_follows_the_long_tail() {
        let right = detail(&[1.0, 1.0, 1.0, 2.0, 10.0]);
        assert!(right.skewness > 0.0);
        let left = detail(&[-10.0, -2.0, -1.0, -1.0, -1.0]);
        assert!(left.skewness < 0.0);
    }

    #[test]
    fn detail_empty_is_all_missing() {
        let d = detail(&[]);
        assert_eq!(d.obs, 0);
        assert!(d.p50.is_nan());
        assert!(d.smallest.is_empty());
        assert!(d.largest.is_empty());
        assert!(d.kurtosis.is_nan());
    }

    #[test]
    fn detail_single_observation() {
        let d = detail(&[4.0]);
        assert_eq!(d.obs, 1);
        assert!(approx(d.p1, 4.0));
        assert!(approx(d.p50, 4.0));
        assert!(approx(d.p99, 4.0));
        assert_eq!(d.smallest, vec![4.0]);
        assert_eq!(d.largest, vec![4.0]);
        assert!(d.variance.is_nan());
        assert!(d.skewness.is_nan());
    }

    proptest! {
        #[test]
        fn mean_stays_between_min_and_max(xs in proptest::collection::vec(-1.0e6..1.0e6f64, 1..64)) {
            let s = basic(&xs);
            prop_assert!(s.min <= s.mean + 1e-6);
            prop_assert!(s.mean <= s.max + 1e-6);
        }

        // The median interpolates while the rest round up, so on tiny
        // samples p25 may legitimately sit above p50. Monotonicity is
        // only promised within the higher-rule percentiles.
        #[test]
        fn percentiles_are_monotone(xs in proptest::collection::vec(-1.0e6..1.0e6f64, 2..64)) {
            let d = detail(&xs);
            let ps = [d.p1, d.p5, d.p10, d.p25, d.p75, d.p90, d.p95, d.p99];
            for w in ps.windows(2) {
                prop_assert!(w[0] <= w[1] + 1e-9);
            }
            let lo = d.smallest[0];
            let hi = d.largest[d.largest.len() - 1];
            prop_assert!(lo <= ps[0] && ps[7] <= hi);
            prop_assert!(lo <= d.p50 + 1e-9 && d.p50 <= hi + 1e-9);
        }
    }
}
