//! Diagnostic panel use-case service.
//!
//! # Responsibility
//! - Simulate, classify and persist demo panels.
//! - Classify caller-provided readings against the configured catalog.

use crate::diagnostic::catalog::find_metric;
use crate::diagnostic::classify::classify;
use crate::diagnostic::simulate::simulate_panel;
use crate::model::diagnostic::{DiagnosticDataPoint, DiagnosticMetric};
use crate::repo::diagnostic_repo::{DiagnosticRepository, StoredPanel, StoredReading};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use rand::Rng;
use uuid::Uuid;

const METRIC_HISTORY_LIMIT_MAX: u32 = 100;

/// Diagnostic use-case facade over a diagnostic repository.
pub struct DiagnosticService<R: DiagnosticRepository> {
    repo: R,
    catalog: Vec<DiagnosticMetric>,
}

impl<R: DiagnosticRepository> DiagnosticService<R> {
    /// `catalog` must already be validated (see `LifeConfig::validate`).
    pub fn new(repo: R, catalog: Vec<DiagnosticMetric>) -> Self {
        Self { repo, catalog }
    }

    pub fn catalog(&self) -> &[DiagnosticMetric] {
        &self.catalog
    }

    /// Generates one reading per catalog metric and stores the panel.
    pub fn simulate_panel<G: Rng + ?Sized>(
        &mut self,
        rng: &mut G,
        recorded_at: i64,
    ) -> ServiceResult<StoredPanel> {
        let panel = StoredPanel {
            panel_id: Uuid::new_v4(),
            recorded_at,
            points: simulate_panel(&self.catalog, rng),
        };
        self.repo.insert_panel(&panel)?;

        info!(
            "event=diagnostic_simulate module=service status=ok readings={}",
            panel.points.len()
        );
        Ok(panel)
    }

    pub fn latest_panel(&self) -> ServiceResult<Option<StoredPanel>> {
        Ok(self.repo.latest_panel()?)
    }

    /// Reading history of one metric, newest first; limit clamps to 100.
    pub fn metric_history(&self, metric_name: &str, limit: u32) -> ServiceResult<Vec<StoredReading>> {
        let metric = self.metric(metric_name)?;
        let limit = limit.clamp(1, METRIC_HISTORY_LIMIT_MAX);
        Ok(self.repo.readings_for_metric(&metric.name, limit)?)
    }

    /// Classifies a caller-provided value without storing it.
    pub fn classify_reading(&self, metric_name: &str, value: f64) -> ServiceResult<DiagnosticDataPoint> {
        if !value.is_finite() {
            return Err(ServiceError::NonFiniteValue);
        }
        let metric = self.metric(metric_name)?;
        Ok(DiagnosticDataPoint {
            metric_name: metric.name.clone(),
            value,
            unit: metric.unit.clone(),
            status: classify(value, metric),
            domain: metric.domain,
        })
    }

    fn metric(&self, name: &str) -> ServiceResult<&DiagnosticMetric> {
        find_metric(&self.catalog, name).ok_or_else(|| ServiceError::UnknownMetric(name.trim().to_string()))
    }
}
