//! Built-in metric reference table.

use crate::model::diagnostic::{BandRange, DiagnosticDomain, DiagnosticMetric};

/// Returns the default reference ranges shipped with the app.
pub fn default_catalog() -> Vec<DiagnosticMetric> {
    use DiagnosticDomain::{Cardiovascular, Hormonal, Inflammation, Metabolic, Nutrient, Recovery};

    vec![
        DiagnosticMetric::new("Fasting Glucose", "mg/dL", Metabolic, BandRange::new(70.0, 90.0))
            .with_borderline_high(BandRange::new(90.0, 100.0))
            .with_borderline_low(BandRange::new(60.0, 70.0))
            .with_precision(0),
        DiagnosticMetric::new("HbA1c", "%", Metabolic, BandRange::new(4.5, 5.4))
            .with_borderline_high(BandRange::new(5.4, 5.7)),
        DiagnosticMetric::new("Triglycerides", "mg/dL", Metabolic, BandRange::new(40.0, 100.0))
            .with_borderline_high(BandRange::new(100.0, 150.0))
            .with_precision(0),
        DiagnosticMetric::new("HDL Cholesterol", "mg/dL", Cardiovascular, BandRange::new(60.0, 90.0))
            .with_borderline_low(BandRange::new(40.0, 60.0))
            .with_precision(0),
        DiagnosticMetric::new("LDL Cholesterol", "mg/dL", Cardiovascular, BandRange::new(50.0, 100.0))
            .with_borderline_high(BandRange::new(100.0, 130.0))
            .with_precision(0),
        DiagnosticMetric::new("Resting Heart Rate", "bpm", Cardiovascular, BandRange::new(50.0, 65.0))
            .with_borderline_high(BandRange::new(65.0, 80.0))
            .with_borderline_low(BandRange::new(40.0, 50.0))
            .with_precision(0),
        DiagnosticMetric::new("hs-CRP", "mg/L", Inflammation, BandRange::new(0.0, 1.0))
            .with_borderline_high(BandRange::new(1.0, 3.0))
            .with_precision(2),
        DiagnosticMetric::new("Vitamin D", "ng/mL", Nutrient, BandRange::new(40.0, 60.0))
            .with_borderline_high(BandRange::new(60.0, 80.0))
            .with_borderline_low(BandRange::new(30.0, 40.0)),
        DiagnosticMetric::new("Ferritin", "ng/mL", Nutrient, BandRange::new(40.0, 150.0))
            .with_borderline_high(BandRange::new(150.0, 300.0))
            .with_borderline_low(BandRange::new(20.0, 40.0))
            .with_precision(0),
        DiagnosticMetric::new("TSH", "mIU/L", Hormonal, BandRange::new(0.5, 2.5))
            .with_borderline_high(BandRange::new(2.5, 4.5))
            .with_precision(2),
        DiagnosticMetric::new("Heart Rate Variability", "ms", Recovery, BandRange::new(60.0, 100.0))
            .with_borderline_low(BandRange::new(40.0, 60.0))
            .with_precision(0),
        DiagnosticMetric::new("Sleep Efficiency", "%", Recovery, BandRange::new(85.0, 100.0))
            .with_borderline_low(BandRange::new(75.0, 85.0)),
    ]
}

/// Case-insensitive lookup by metric name.
pub fn find_metric<'a>(catalog: &'a [DiagnosticMetric], name: &str) -> Option<&'a DiagnosticMetric> {
    let needle = name.trim();
    catalog
        .iter()
        .find(|metric| metric.name.eq_ignore_ascii_case(needle))
}
