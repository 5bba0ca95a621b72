//! Name → detector lookup, populated at startup.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ScourError};

use super::detectors::{
    AnomalyDetector, DataTypeMismatchDetector, Detector, IncompleteDetector, MissingValueDetector,
};

/// Describes one entry of a detection pass: a display name and the registry
/// key (`code`) it resolves through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorDescriptor {
    /// Display name.
    pub name: String,
    /// Registry key.
    pub code: String,
}

impl DetectorDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// The four built-in detectors in their default order.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Missing values", "missing_value"),
            Self::new("Data type mismatch", "data_type_mismatch"),
            Self::new("Anomalies", "anomaly"),
            Self::new("Incomplete categories", "incomplete"),
        ]
    }
}

/// Registry of available detectors.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    detectors: IndexMap<String, Arc<dyn Detector>>,
}

impl DetectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in detectors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("missing_value", MissingValueDetector);
        registry.register("data_type_mismatch", DataTypeMismatchDetector);
        registry.register("anomaly", AnomalyDetector::default());
        registry.register("incomplete", IncompleteDetector::default());
        registry
    }

    /// Register (or replace) a detector under a key.
    pub fn register(&mut self, code: impl Into<String>, detector: impl Detector + 'static) {
        self.detectors.insert(code.into(), Arc::new(detector));
    }

    /// Look up a single detector.
    pub fn get(&self, code: &str) -> Option<Arc<dyn Detector>> {
        self.detectors.get(code).cloned()
    }

    /// Registered keys, in registration order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.detectors.keys().map(|k| k.as_str())
    }

    /// Resolve every descriptor, failing on the first unknown key.
    pub fn resolve(&self, descriptors: &[DetectorDescriptor]) -> Result<Vec<Arc<dyn Detector>>> {
        descriptors
            .iter()
            .map(|d| {
                self.get(&d.code).ok_or_else(|| {
                    warn!("Detector '{}' ({}) is not registered", d.name, d.code);
                    ScourError::PluginResolution {
                        kind: "detector",
                        name: d.code.clone(),
                    }
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field("detectors", &self.detectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let registry = DetectorRegistry::with_defaults();
        let detectors = registry.resolve(&DetectorDescriptor::defaults()).unwrap();
        let names: Vec<_> = detectors.iter().map(|d| d.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["missing_value", "data_type_mismatch", "anomaly", "incomplete"]
        );
    }

    #[test]
    fn test_unknown_detector_fails_whole_resolution() {
        let registry = DetectorRegistry::with_defaults();
        let mut descriptors = DetectorDescriptor::defaults();
        descriptors.insert(1, DetectorDescriptor::new("Typos", "typo"));

        let err = registry.resolve(&descriptors).err().unwrap();
        assert!(matches!(
            err,
            ScourError::PluginResolution { kind: "detector", ref name } if name == "typo"
        ));
    }
}
