//! Diagnostic classification and demo-data simulation.
//!
//! # Responsibility
//! - Classify lab/sensor values against per-metric reference bands.
//! - Generate weighted-random readings for demo dashboards.
//!
//! # Invariants
//! - Classification is a pure function of `(value, metric)`.
//! - Simulation never touches real sensor integrations.

pub mod catalog;
pub mod classify;
pub mod simulate;
