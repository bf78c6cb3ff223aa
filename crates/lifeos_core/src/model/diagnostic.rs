//! Diagnostic metric and reading model.
//!
//! # Responsibility
//! - Define per-metric reference bands used by the classifier.
//! - Define the classified reading shape shown by dashboards.
//!
//! # Invariants
//! - Every band is finite with `low <= high`.
//! - A high borderline band sits at or above the optimal range; a low
//!   borderline band sits at or below it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Classification outcome of one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStatus {
    Optimal,
    Borderline,
    High,
    Low,
}

impl DiagnosticStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Borderline => "borderline",
            Self::High => "high",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "optimal" => Some(Self::Optimal),
            "borderline" => Some(Self::Borderline),
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Body system a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticDomain {
    Metabolic,
    Cardiovascular,
    Hormonal,
    Inflammation,
    Nutrient,
    Recovery,
}

impl DiagnosticDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metabolic => "metabolic",
            Self::Cardiovascular => "cardiovascular",
            Self::Hormonal => "hormonal",
            Self::Inflammation => "inflammation",
            Self::Nutrient => "nutrient",
            Self::Recovery => "recovery",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "metabolic" => Some(Self::Metabolic),
            "cardiovascular" => Some(Self::Cardiovascular),
            "hormonal" => Some(Self::Hormonal),
            "inflammation" => Some(Self::Inflammation),
            "nutrient" => Some(Self::Nutrient),
            "recovery" => Some(Self::Recovery),
            _ => None,
        }
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRange {
    pub low: f64,
    pub high: f64,
}

impl BandRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    pub fn midpoint(&self) -> f64 {
        self.low + self.span() / 2.0
    }

    fn is_well_formed(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }
}

fn default_precision() -> u32 {
    1
}

/// Static reference definition of one lab/sensor metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMetric {
    pub name: String,
    pub unit: String,
    pub domain: DiagnosticDomain,
    pub optimal_range: BandRange,
    #[serde(default)]
    pub borderline_high_range: Option<BandRange>,
    #[serde(default)]
    pub borderline_low_range: Option<BandRange>,
    /// Decimal places kept by simulated values.
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl DiagnosticMetric {
    /// Creates a metric with only an optimal range.
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        domain: DiagnosticDomain,
        optimal_range: BandRange,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            domain,
            optimal_range,
            borderline_high_range: None,
            borderline_low_range: None,
            precision: default_precision(),
        }
    }

    pub fn with_borderline_high(mut self, range: BandRange) -> Self {
        self.borderline_high_range = Some(range);
        self
    }

    pub fn with_borderline_low(mut self, range: BandRange) -> Self {
        self.borderline_low_range = Some(range);
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Validates reference band invariants.
    pub fn validate(&self) -> Result<(), MetricValidationError> {
        if self.name.trim().is_empty() {
            return Err(MetricValidationError::EmptyName);
        }
        if !self.optimal_range.is_well_formed() {
            return Err(MetricValidationError::MalformedRange {
                metric: self.name.clone(),
                band: "optimal_range",
            });
        }
        if let Some(high) = self.borderline_high_range {
            if !high.is_well_formed() {
                return Err(MetricValidationError::MalformedRange {
                    metric: self.name.clone(),
                    band: "borderline_high_range",
                });
            }
            if high.low < self.optimal_range.high {
                return Err(MetricValidationError::MisplacedBand {
                    metric: self.name.clone(),
                    band: "borderline_high_range",
                });
            }
        }
        if let Some(low) = self.borderline_low_range {
            if !low.is_well_formed() {
                return Err(MetricValidationError::MalformedRange {
                    metric: self.name.clone(),
                    band: "borderline_low_range",
                });
            }
            if low.high > self.optimal_range.low {
                return Err(MetricValidationError::MisplacedBand {
                    metric: self.name.clone(),
                    band: "borderline_low_range",
                });
            }
        }
        if self.precision > 6 {
            return Err(MetricValidationError::PrecisionTooLarge {
                metric: self.name.clone(),
                precision: self.precision,
            });
        }
        Ok(())
    }
}

/// Metric definition validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValidationError {
    EmptyName,
    MalformedRange { metric: String, band: &'static str },
    MisplacedBand { metric: String, band: &'static str },
    PrecisionTooLarge { metric: String, precision: u32 },
}

impl Display for MetricValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "metric name must not be empty"),
            Self::MalformedRange { metric, band } => write!(
                f,
                "metric `{metric}` has malformed {band}; bounds must be finite and low <= high"
            ),
            Self::MisplacedBand { metric, band } => write!(
                f,
                "metric `{metric}` has {band} overlapping the optimal range"
            ),
            Self::PrecisionTooLarge { metric, precision } => write!(
                f,
                "metric `{metric}` precision {precision} exceeds 6 decimals"
            ),
        }
    }
}

impl Error for MetricValidationError {}

/// One classified reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticDataPoint {
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    pub status: DiagnosticStatus,
    pub domain: DiagnosticDomain,
}

#[cfg(test)]
mod tests {
    use super::{BandRange, DiagnosticDomain, DiagnosticMetric, MetricValidationError};

    fn glucose() -> DiagnosticMetric {
        DiagnosticMetric::new(
            "Fasting Glucose",
            "mg/dL",
            DiagnosticDomain::Metabolic,
            BandRange::new(70.0, 90.0),
        )
    }

    #[test]
    fn band_contains_is_inclusive() {
        let band = BandRange::new(70.0, 90.0);
        assert!(band.contains(70.0));
        assert!(band.contains(90.0));
        assert!(!band.contains(90.01));
        assert_eq!(band.midpoint(), 80.0);
    }

    #[test]
    fn validate_accepts_adjacent_bands() {
        let metric = glucose()
            .with_borderline_high(BandRange::new(90.0, 100.0))
            .with_borderline_low(BandRange::new(60.0, 70.0));
        assert_eq!(metric.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_overlapping_high_band() {
        let metric = glucose().with_borderline_high(BandRange::new(85.0, 100.0));
        assert!(matches!(
            metric.validate(),
            Err(MetricValidationError::MisplacedBand {
                band: "borderline_high_range",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_reversed_and_non_finite_ranges() {
        let mut metric = glucose();
        metric.optimal_range = BandRange::new(90.0, 70.0);
        assert!(matches!(
            metric.validate(),
            Err(MetricValidationError::MalformedRange { .. })
        ));

        let metric = glucose().with_borderline_low(BandRange::new(f64::NAN, 70.0));
        assert!(matches!(
            metric.validate(),
            Err(MetricValidationError::MalformedRange { .. })
        ));
    }

    #[test]
    fn deserialize_applies_defaults_for_optional_fields() {
        let metric: DiagnosticMetric = serde_json::from_value(serde_json::json!({
            "name": "HRV",
            "unit": "ms",
            "domain": "recovery",
            "optimal_range": { "low": 60.0, "high": 100.0 }
        }))
        .unwrap();
        assert_eq!(metric.precision, 1);
        assert_eq!(metric.borderline_high_range, None);
        assert_eq!(metric.domain, DiagnosticDomain::Recovery);
    }
}
