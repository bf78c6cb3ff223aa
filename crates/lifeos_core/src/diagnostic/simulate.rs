//! Weighted-random demo readings.
//!
//! # Invariants
//! - 70% of samples land in the optimal range, 15% in a borderline band and
//!   15% in the tail beyond it.
//! - Values are rounded to the metric precision. Tails start one precision
//!   step beyond the band edge so rounding never folds them back into it.
//! - Metrics whose optimal range and low band start at or above zero never
//!   produce negative values.

use crate::diagnostic::classify::classify;
use crate::model::diagnostic::{
    BandRange, DiagnosticDataPoint, DiagnosticDomain, DiagnosticMetric, DiagnosticStatus,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const OPTIMAL_WEIGHT: f64 = 0.70;
const BORDERLINE_WEIGHT: f64 = 0.15;
/// Tail width as a share of the optimal span.
const TAIL_SPAN_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    High,
    Low,
}

/// Draws one simulated value for `metric`.
pub fn generate_random_value<R: Rng + ?Sized>(metric: &DiagnosticMetric, rng: &mut R) -> f64 {
    let roll: f64 = rng.gen();
    let optimal = metric.optimal_range;

    let raw = if roll < OPTIMAL_WEIGHT {
        sample(optimal, rng)
    } else if roll < OPTIMAL_WEIGHT + BORDERLINE_WEIGHT {
        match pick_band(metric, rng) {
            Some((_, band)) => sample(band, rng),
            None => sample(optimal, rng),
        }
    } else {
        let tail = tail_range(metric, rng);
        sample(tail, rng)
    };

    round_to(raw, metric.precision)
}

/// Draws and classifies one reading.
pub fn simulate_data_point<R: Rng + ?Sized>(
    metric: &DiagnosticMetric,
    rng: &mut R,
) -> DiagnosticDataPoint {
    let value = generate_random_value(metric, rng);
    DiagnosticDataPoint {
        metric_name: metric.name.clone(),
        value,
        unit: metric.unit.clone(),
        status: classify(value, metric),
        domain: metric.domain,
    }
}

/// Draws one reading per catalog metric, in catalog order.
pub fn simulate_panel<R: Rng + ?Sized>(
    catalog: &[DiagnosticMetric],
    rng: &mut R,
) -> Vec<DiagnosticDataPoint> {
    catalog
        .iter()
        .map(|metric| simulate_data_point(metric, rng))
        .collect()
}

/// Per-status counts and per-domain optimal ratio of a panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelSummary {
    pub optimal: usize,
    pub borderline: usize,
    pub high: usize,
    pub low: usize,
    /// Share of optimal readings per domain, in `[0.0, 1.0]`.
    pub domain_optimal_ratio: BTreeMap<DiagnosticDomain, f64>,
}

impl PanelSummary {
    pub fn total(&self) -> usize {
        self.optimal + self.borderline + self.high + self.low
    }

    /// Readings that need attention (anything not optimal).
    pub fn flagged(&self) -> usize {
        self.total() - self.optimal
    }
}

/// Summarizes a panel of readings.
pub fn summarize(points: &[DiagnosticDataPoint]) -> PanelSummary {
    let mut summary = PanelSummary::default();
    let mut per_domain: BTreeMap<DiagnosticDomain, (usize, usize)> = BTreeMap::new();

    for point in points {
        let counts = per_domain.entry(point.domain).or_default();
        counts.1 += 1;
        match point.status {
            DiagnosticStatus::Optimal => {
                summary.optimal += 1;
                counts.0 += 1;
            }
            DiagnosticStatus::Borderline => summary.borderline += 1,
            DiagnosticStatus::High => summary.high += 1,
            DiagnosticStatus::Low => summary.low += 1,
        }
    }

    summary.domain_optimal_ratio = per_domain
        .into_iter()
        .map(|(domain, (optimal, total))| (domain, optimal as f64 / total as f64))
        .collect();
    summary
}

fn pick_band<R: Rng + ?Sized>(metric: &DiagnosticMetric, rng: &mut R) -> Option<(Side, BandRange)> {
    match (metric.borderline_high_range, metric.borderline_low_range) {
        (Some(high), Some(low)) => {
            if rng.gen_bool(0.5) {
                Some((Side::High, high))
            } else {
                Some((Side::Low, low))
            }
        }
        (Some(high), None) => Some((Side::High, high)),
        (None, Some(low)) => Some((Side::Low, low)),
        (None, None) => None,
    }
}

fn tail_range<R: Rng + ?Sized>(metric: &DiagnosticMetric, rng: &mut R) -> BandRange {
    let optimal = metric.optimal_range;
    let width = (optimal.span() * TAIL_SPAN_RATIO).max(f64::EPSILON);
    let step = 10f64.powi(-(metric.precision as i32));

    let side = match pick_band(metric, rng) {
        Some((side, _)) => side,
        None if rng.gen_bool(0.5) => Side::High,
        None => Side::Low,
    };

    let low_edge = metric
        .borderline_low_range
        .map_or(optimal.low, |band| band.low);
    let low_top = low_edge - step;
    let non_negative = optimal.low >= 0.0 && low_edge >= 0.0;

    if side == Side::Low && !(non_negative && low_top < 0.0) {
        let floor = if non_negative {
            (low_top - width).max(0.0)
        } else {
            low_top - width
        };
        return BandRange::new(floor, low_top);
    }

    let high_edge = metric
        .borderline_high_range
        .map_or(optimal.high, |band| band.high);
    BandRange::new(high_edge + step, high_edge + step + width)
}

fn sample<R: Rng + ?Sized>(band: BandRange, rng: &mut R) -> f64 {
    if band.span() <= 0.0 {
        return band.low;
    }
    rng.gen_range(band.low..=band.high)
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
