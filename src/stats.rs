// Distribution statistics over per-project efficiency scores.
//
// Repeated values (the many zeros from projects with no logged hours) stay in
// the ordered sequence; with more than half the projects at zero the median is
// exactly zero.
use crate::util::average;
use serde::Serialize;

/// Ranks reported in [`DistributionSummary::percentiles`].
pub const PERCENTILE_RANKS: [f64; 4] = [25.0, 50.0, 75.0, 90.0];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Linear interpolation between closest ranks over an ascending slice:
/// position `p/100 * (n-1)`, blended between its floor and ceiling.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let p = p.clamp(0.0, 100.0);
    let pos = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    // Clamp so rounding never lifts the blend past its neighbours.
    (sorted[lo] + (sorted[hi] - sorted[lo]) * frac).clamp(sorted[lo], sorted[hi])
}

pub fn percentile(values: &[f64], p: f64) -> f64 {
    percentile_sorted(&sorted(values), p)
}

pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = average(values);
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Summarize a set of scores. The input is sorted first, so the result does
/// not depend on the order the scores arrive in. Non-finite values are dropped.
pub fn summarize(values: &[f64]) -> DistributionSummary {
    let v = sorted(values);
    if v.is_empty() {
        return DistributionSummary::default();
    }
    let pct = |p| percentile_sorted(&v, p);
    DistributionSummary {
        count: v.len(),
        mean: average(&v),
        median: pct(50.0),
        std_dev: population_std_dev(&v),
        min: v[0],
        max: v[v.len() - 1],
        percentiles: Percentiles {
            p25: pct(PERCENTILE_RANKS[0]),
            p50: pct(PERCENTILE_RANKS[1]),
            p75: pct(PERCENTILE_RANKS[2]),
            p90: pct(PERCENTILE_RANKS[3]),
        },
    }
}
