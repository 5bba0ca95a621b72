//! Integration tests for scour.

use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

use scour::binning::AxisPairing;
use scour::detection::{
    AnomalyDetector, Detector, DetectorRegistry, IncompleteDetector, MissingValueDetector,
};
use scour::history::{TransformationHistory, TransformationInfo, TransformationKind};
use scour::table::{ID_BACKUP_COLUMN, ID_COLUMN, ingest};
use scour::{
    DetectorDescriptor, ErrorDetectionEngine, ErrorKind, ScourError, Session, SessionConfig, Value,
};

/// Helper to create a temporary file with given content and extension.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn people_csv() -> String {
    let mut content = String::from("name,age,city\n");
    for i in 0..19 {
        content.push_str(&format!("p{},{},Oslo\n", i, 10 + (i % 11)));
    }
    content.push_str("outlier,1000,Oslo\n");
    content.push_str("ghost,,Rome\n");
    content.push_str("typo,unknown,Olso\n");
    content
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_open_csv_assigns_ids() {
    let file = create_test_file(&people_csv(), ".csv");
    let session = Session::open(file.path(), SessionConfig::default()).expect("Open failed");

    let source = session.source().expect("source metadata");
    assert_eq!(source.row_count, 22);
    assert_eq!(source.column_count, 3);
    assert_eq!(source.format, "csv");
    assert!(source.hash.starts_with("sha256:"));

    assert_eq!(session.table().columns()[0], ID_COLUMN);
    assert_eq!(session.table().ids().collect::<Vec<_>>(), (1..=22).collect::<Vec<u64>>());
}

#[test]
fn test_open_tsv_auto_detect() {
    let file = create_test_file("a\tb\n1\tx\n2\ty\n", ".txt");
    let session = Session::open(file.path(), SessionConfig::default()).expect("Open failed");
    assert_eq!(session.source().unwrap().format, "tsv");
    assert_eq!(session.table().data_columns().count(), 2);
}

#[test]
fn test_open_json() {
    let file = create_test_file(r#"[{"x": 1, "y": "a"}, {"x": null, "y": "b"}]"#, ".json");
    let session = Session::open(file.path(), SessionConfig::default()).expect("Open failed");
    assert_eq!(session.table().row_count(), 2);
    assert_eq!(session.error_map().kinds("x", 2)[0], ErrorKind::Missing);
}

#[test]
fn test_duplicate_ids_are_repaired() {
    let file = create_test_file("ID,v\n7,a\n7,b\n9,c\n", ".csv");
    let session = Session::open(file.path(), SessionConfig::default()).expect("Open failed");
    let table = session.table();

    assert_eq!(table.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(table.has_column(ID_BACKUP_COLUMN));
    assert_eq!(table.row(2).unwrap().value(ID_BACKUP_COLUMN), &Value::Number(7.0));
}

#[test]
fn test_conforming_ids_are_kept() {
    let file = create_test_file("ID,v\n10,a\n20,b\n", ".csv");
    let session = Session::open(file.path(), SessionConfig::default()).expect("Open failed");
    assert_eq!(session.table().ids().collect::<Vec<_>>(), vec![10, 20]);
    assert!(!session.table().has_column(ID_BACKUP_COLUMN));
}

#[test]
fn test_unsupported_extension() {
    let file = create_test_file("irrelevant", ".xlsx");
    let result = Session::open(file.path(), SessionConfig::default());
    assert!(matches!(result, Err(ScourError::UnsupportedFormat(_))));
}

// =============================================================================
// Detection
// =============================================================================

#[test]
fn test_missing_values_flagged() {
    let table = ingest(
        vec!["v".to_string()],
        vec![
            vec![Value::Null],
            vec!["".into()],
            vec![" ".into()],
            vec!["NULL".into()],
            vec!["undefined".into()],
            vec!["ok".into()],
            vec![Value::Number(5.0)],
        ],
    );
    let map = ErrorDetectionEngine::run(&table, &[std::sync::Arc::new(MissingValueDetector)]);
    let flagged: Vec<u64> = map.column("v").unwrap().keys().copied().collect();
    assert_eq!(flagged, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_anomaly_requires_enough_samples() {
    let mut rows: Vec<Vec<Value>> = (0..19).map(|i| vec![Value::Number(10.0 + (i % 11) as f64)]).collect();
    rows.push(vec![Value::Number(1000.0)]);
    let table = ingest(vec!["v".to_string()], rows);
    let partial = AnomalyDetector::default().detect(&table);
    assert_eq!(partial["v"].keys().copied().collect::<Vec<_>>(), vec![20]);

    let few: Vec<Vec<Value>> = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 5000.0]
        .iter()
        .map(|&n| vec![Value::Number(n)])
        .collect();
    let table = ingest(vec!["v".to_string()], few);
    assert!(AnomalyDetector::default().detect(&table).is_empty());
}

#[test]
fn test_incomplete_categories() {
    let rows = ["A", "A", "A", "B", "B", "C"]
        .iter()
        .map(|s| vec![Value::from(*s)])
        .collect();
    let table = ingest(vec!["g".to_string()], rows);
    let partial = IncompleteDetector::default().detect(&table);
    assert_eq!(partial["g"].keys().copied().collect::<Vec<_>>(), vec![4, 5, 6]);
}

#[test]
fn test_session_detection_end_to_end() {
    let file = create_test_file(&people_csv(), ".csv");
    let session = Session::open(file.path(), SessionConfig::default()).expect("Open failed");
    let map = session.error_map();

    assert!(map.kinds("age", 20).contains(&ErrorKind::Anomaly));
    assert_eq!(map.kinds("age", 21)[0], ErrorKind::Missing);
    assert!(map.kinds("age", 22).contains(&ErrorKind::Mismatch));
    assert!(map.kinds("city", 22).contains(&ErrorKind::Incomplete));
    assert!(map.kinds("city", 1).is_empty());
}

#[test]
fn test_detection_is_deterministic() {
    let file = create_test_file(&people_csv(), ".csv");
    let a = Session::open(file.path(), SessionConfig::default()).unwrap();
    let b = Session::open(file.path(), SessionConfig::default()).unwrap();
    assert_eq!(
        serde_json::to_string(a.error_map()).unwrap(),
        serde_json::to_string(b.error_map()).unwrap()
    );
}

#[test]
fn test_custom_detector_registration() {
    struct NegativeDetector;

    impl Detector for NegativeDetector {
        fn name(&self) -> &str {
            "negative"
        }

        fn detect(&self, table: &scour::Table) -> scour::detection::PartialColumnErrorMap {
            let mut map = scour::detection::PartialColumnErrorMap::new();
            for column in table.data_columns() {
                for (id, value) in table.column_values(column) {
                    if value.as_number().is_some_and(|n| n < 0.0) {
                        map.entry(column.to_string())
                            .or_default()
                            .insert(id, ErrorKind::Anomaly);
                    }
                }
            }
            map
        }
    }

    let mut registry = DetectorRegistry::with_defaults();
    registry.register("negative", NegativeDetector);

    let table = ingest(
        vec!["v".to_string()],
        vec![vec![Value::Number(-1.0)], vec![Value::Number(2.0)]],
    );
    let descriptors = vec![DetectorDescriptor::new("Negative", "negative")];
    let map = ErrorDetectionEngine::run_descriptors(&table, &registry, &descriptors).unwrap();
    assert_eq!(map.kinds("v", 1), &[ErrorKind::Anomaly]);
    assert!(map.kinds("v", 2).is_empty());
}

#[test]
fn test_unknown_detector_yields_no_map() {
    let table = ingest(vec!["v".to_string()], vec![vec![Value::Null]]);
    let descriptors = vec![
        DetectorDescriptor::new("Missing", "missing_value"),
        DetectorDescriptor::new("Ghost", "ghost"),
    ];
    let result =
        ErrorDetectionEngine::run_descriptors(&table, &DetectorRegistry::with_defaults(), &descriptors);
    assert!(matches!(
        result,
        Err(ScourError::PluginResolution { kind: "detector", ref name }) if name == "ghost"
    ));
}

// =============================================================================
// History
// =============================================================================

#[test]
fn test_undo_redo_round_trip() {
    let table = ingest(
        vec!["v".to_string()],
        (1..=5).map(|i| vec![Value::Number(i as f64)]).collect(),
    );
    let mut history = TransformationHistory::new(table.clone());

    history
        .filter_rows(|row| Ok(row.id() % 2 == 1), TransformationInfo::default())
        .unwrap();
    let filtered = history.table().clone();

    assert!(history.undo());
    assert_eq!(history.table(), &table);
    assert!(history.redo());
    assert_eq!(history.table(), &filtered);
}

#[test]
fn test_new_mutation_discards_redo() {
    let table = ingest(vec!["v".to_string()], vec![vec![Value::Number(1.0)]]);
    let mut history = TransformationHistory::new(table);

    history
        .derive_column("w", |_| Ok(Value::Bool(true)), TransformationInfo::default())
        .unwrap();
    assert!(history.undo());
    assert!(history.can_redo());

    history
        .derive_column("w", |_| Ok(Value::Bool(false)), TransformationInfo::default())
        .unwrap();
    assert!(!history.can_redo());
    assert!(!history.redo());
    assert_eq!(history.log().len(), 2);
}

#[test]
fn test_failing_predicate_leaves_state_untouched() {
    let table = ingest(vec!["v".to_string()], vec![vec![Value::Number(1.0)]]);
    let mut history = TransformationHistory::new(table.clone());

    let result = history.filter_rows(
        |_| Err(ScourError::Wrangler("boom".to_string())),
        TransformationInfo::default(),
    );
    assert!(result.is_err());
    assert_eq!(history.table(), &table);
    assert!(history.log().is_empty());
    assert!(!history.can_undo());
}

#[test]
fn test_script_export_in_order() {
    let file = create_test_file(&people_csv(), ".csv");
    let mut session = Session::open(file.path(), SessionConfig::default()).unwrap();

    session.select(vec![20]);
    session.apply_wrangler("remove_selected", "age", None).unwrap();
    session.select(vec![21]);
    session.apply_wrangler("impute_median", "age", None).unwrap();

    let kinds: Vec<TransformationKind> = session.log().iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![TransformationKind::Remove, TransformationKind::Transform]);

    let script = session.export_script();
    let statements: Vec<&str> = script
        .lines()
        .filter(|l| l.starts_with("df = df[~") || l.starts_with("df.loc["))
        .collect();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].contains("df[\"age\"] == 1000"));
    assert!(statements[1].contains("df[\"age\"].isna()"));
    assert!(script.contains("df = df.head(22)"));
}

#[test]
fn test_log_survives_undo() {
    let file = create_test_file(&people_csv(), ".csv");
    let mut session = Session::open(file.path(), SessionConfig::default()).unwrap();

    session.select(vec![20]);
    session.apply_wrangler("remove_selected", "age", None).unwrap();
    assert!(session.undo().unwrap());

    assert_eq!(session.table().row_count(), 22);
    assert_eq!(session.log().len(), 1);
    assert!(session.export_script().contains("# 1. Remove 1 row selected on age"));
}

// =============================================================================
// Binning
// =============================================================================

#[test]
fn test_histogram_partitions_mixed_column() {
    let mut rows: Vec<Vec<Value>> = (0..7).map(|i| vec![Value::Number(i as f64)]).collect();
    rows.push(vec!["x".into()]);
    rows.push(vec!["y".into()]);
    rows.push(vec![Value::Null]);
    let session = Session::new(
        ingest(vec!["v".to_string()], rows),
        SessionConfig::default(),
    )
    .unwrap();

    let histogram = session.histogram("v").unwrap();
    let mut ids: Vec<u64> = histogram.bins().flat_map(|b| b.ids.iter().copied()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    assert_eq!(histogram.categorical_bins.last().unwrap().key.to_string(), "NaN");
}

#[test]
fn test_grid_partitions_rows() {
    let file = create_test_file(&people_csv(), ".csv");
    let session = Session::open(file.path(), SessionConfig::default()).unwrap();
    let grid = session.grid("age", "city").unwrap();

    let mut ids: Vec<u64> = grid.cells.iter().flat_map(|c| c.ids.iter().copied()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=22).collect::<Vec<u64>>());
    assert!(grid.cells.iter().all(|c| !c.ids.is_empty()));
    assert_eq!(grid.cells_for(AxisPairing::NumericNumeric).count(), 0);
    assert!(grid.cells_for(AxisPairing::NumericCategorical).count() > 0);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_save_cleaned_script_and_log() {
    let file = create_test_file(&people_csv(), ".csv");
    let mut session = Session::open(file.path(), SessionConfig::default()).unwrap();
    session.select(vec![20, 22]);
    session.apply_wrangler("remove_selected", "age", None).unwrap();

    let dir = TempDir::new().unwrap();
    let cleaned = dir.path().join("cleaned.csv");
    let script = dir.path().join("clean.py");
    let log = dir.path().join("log.json");

    session.save_cleaned(&cleaned).unwrap();
    session.save_script(&script).unwrap();
    session.save_log(&log).unwrap();

    let reopened = Session::open(&cleaned, SessionConfig::default()).unwrap();
    assert_eq!(reopened.table().row_count(), 20);

    assert!(fs::read_to_string(&script).unwrap().starts_with("import pandas as pd"));

    let loaded = TransformationHistory::load_log(&log).unwrap();
    assert_eq!(loaded, session.log());
}
