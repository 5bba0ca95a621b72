//! Error detection: pluggable detectors merged into a [`ColumnErrorMap`].
//!
//! Each detector is a pure function `Table -> PartialColumnErrorMap`. The
//! [`ErrorDetectionEngine`] runs them in list order and appends their tags
//! cell by cell, so only the merge order is observable.

mod detectors;
mod engine;
mod kind;
mod registry;

pub use detectors::{
    ANOMALY_STDDEV_FACTOR, AnomalyDetector, DataTypeMismatchDetector, Detector,
    IncompleteDetector, MIN_ANOMALY_SAMPLES, MIN_CATEGORY_COUNT, MissingValueDetector,
};
pub use engine::ErrorDetectionEngine;
pub use kind::{ColumnErrorMap, ErrorKind, PartialColumnErrorMap};
pub use registry::{DetectorDescriptor, DetectorRegistry};
