//! Runs an ordered detector list and merges the results.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::table::Table;

use super::detectors::Detector;
use super::kind::ColumnErrorMap;
use super::registry::{DetectorDescriptor, DetectorRegistry};

/// Composite detector runner.
pub struct ErrorDetectionEngine;

impl ErrorDetectionEngine {
    /// Run detectors against the table and merge their tags in list order.
    pub fn run(table: &Table, detectors: &[Arc<dyn Detector>]) -> ColumnErrorMap {
        let partials = detectors.iter().map(|detector| {
            let partial = detector.detect(table);
            debug!(
                "Detector '{}' flagged {} cells",
                detector.name(),
                partial.values().map(|rows| rows.len()).sum::<usize>()
            );
            partial
        });
        ColumnErrorMap::merge(partials)
    }

    /// Resolve descriptors through a registry, then run.
    ///
    /// A resolution failure returns the error and no map.
    pub fn run_descriptors(
        table: &Table,
        registry: &DetectorRegistry,
        descriptors: &[DetectorDescriptor],
    ) -> Result<ColumnErrorMap> {
        let detectors = registry.resolve(descriptors)?;
        Ok(Self::run(table, &detectors))
    }
}
