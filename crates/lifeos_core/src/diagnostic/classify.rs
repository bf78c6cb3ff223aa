//! Band classifier.

use crate::model::diagnostic::{DiagnosticMetric, DiagnosticStatus};

/// Classifies `value` against the reference bands of `metric`.
///
/// Rules, first match wins:
/// 1. inside `optimal_range` -> `Optimal`
/// 2. inside a borderline band -> `Borderline`
/// 3. above the high borderline band -> `High`
/// 4. below the low borderline band -> `Low`
/// 5. anything else -> `Optimal`
///
/// Rule 5 means an out-of-range value on a side with no borderline band
/// reports `Optimal`.
pub fn classify(value: f64, metric: &DiagnosticMetric) -> DiagnosticStatus {
    debug_assert!(value.is_finite(), "diagnostic value must be finite");

    if metric.optimal_range.contains(value) {
        return DiagnosticStatus::Optimal;
    }

    let high = metric.borderline_high_range;
    let low = metric.borderline_low_range;

    if high.is_some_and(|band| band.contains(value)) || low.is_some_and(|band| band.contains(value))
    {
        return DiagnosticStatus::Borderline;
    }
    if high.is_some_and(|band| value > band.high) {
        return DiagnosticStatus::High;
    }
    if low.is_some_and(|band| value < band.low) {
        return DiagnosticStatus::Low;
    }

    DiagnosticStatus::Optimal
}

#[cfg(test)]
mod tests {
    use super::classify;
    use crate::diagnostic::catalog::default_catalog;
    use crate::model::diagnostic::{
        BandRange, DiagnosticDomain, DiagnosticMetric, DiagnosticStatus,
    };

    fn glucose() -> DiagnosticMetric {
        DiagnosticMetric::new(
            "Fasting Glucose",
            "mg/dL",
            DiagnosticDomain::Metabolic,
            BandRange::new(70.0, 90.0),
        )
        .with_borderline_high(BandRange::new(90.0, 100.0))
    }

    #[test]
    fn classifies_reference_examples() {
        let metric = glucose();
        assert_eq!(classify(80.0, &metric), DiagnosticStatus::Optimal);
        assert_eq!(classify(95.0, &metric), DiagnosticStatus::Borderline);
        assert_eq!(classify(105.0, &metric), DiagnosticStatus::High);
    }

    #[test]
    fn shared_boundary_prefers_optimal() {
        assert_eq!(classify(90.0, &glucose()), DiagnosticStatus::Optimal);
        assert_eq!(classify(100.0, &glucose()), DiagnosticStatus::Borderline);
    }

    #[test]
    fn low_band_classifies_borderline_and_low() {
        let metric = glucose().with_borderline_low(BandRange::new(60.0, 70.0));
        assert_eq!(classify(65.0, &metric), DiagnosticStatus::Borderline);
        assert_eq!(classify(55.0, &metric), DiagnosticStatus::Low);
    }

    #[test]
    fn out_of_range_without_band_falls_back_to_optimal() {
        // Only a high band: a value below the optimal range has no low band.
        assert_eq!(classify(40.0, &glucose()), DiagnosticStatus::Optimal);

        let bare = DiagnosticMetric::new(
            "HRV",
            "ms",
            DiagnosticDomain::Recovery,
            BandRange::new(60.0, 100.0),
        );
        assert_eq!(classify(250.0, &bare), DiagnosticStatus::Optimal);
    }

    #[test]
    fn midpoint_of_every_catalog_metric_is_optimal() {
        for metric in default_catalog() {
            assert_eq!(
                classify(metric.optimal_range.midpoint(), &metric),
                DiagnosticStatus::Optimal,
                "metric {}",
                metric.name
            );
        }
    }
}
