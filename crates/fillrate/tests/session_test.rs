//! Session file tests: saving, loading and the two combination shapes.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

use fillrate::config::{with_json_extension, PersistedCombination};
use fillrate::{ConfigurationBuilder, Fillrate, FillrateError, ProgressConfig, SessionFile};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

/// Write a session file pointing at `data`.
fn write_session(dir: &TempDir, data: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("session.json");
    let json = body.replace("$DATA", &serde_json::to_string(data).unwrap());
    fs::write(&path, json).unwrap();
    path
}

const DATA: &str = "id,name,phone,email\n\
                    1,Ann,555,\n\
                    2,NA,,b@c.d\n\
                    3,Cy,,\n";

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_save_and_load_round_trip() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let session_path = dir.path().join("nested/dir/session.json");

    let config = ConfigurationBuilder::open(data.path(), None)
        .unwrap()
        .select_fields("1,2,3,4")
        .unwrap()
        .invalid_values_from_str("2:unknown:NA")
        .unwrap()
        .combinations_from_expression("1:2, 3/4")
        .unwrap()
        .build()
        .unwrap();
    SessionFile::from_configuration(&config)
        .save(&session_path)
        .unwrap();

    let loaded = SessionFile::load(&session_path)
        .unwrap()
        .into_configuration()
        .unwrap();

    assert_eq!(loaded.headers(), config.headers());
    assert_eq!(loaded.combinations(), config.combinations());
    let name = loaded.columns().get(2).unwrap();
    assert_eq!(
        name.invalid_values.iter().collect::<Vec<_>>(),
        vec!["NA", "unknown"]
    );
}

#[test]
fn test_saved_file_uses_nested_shape() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let session_path = dir.path().join("session.json");

    let config = ConfigurationBuilder::open(data.path(), None)
        .unwrap()
        .combinations_from_expression("1:2, 3/4")
        .unwrap()
        .build()
        .unwrap();
    SessionFile::from_configuration(&config)
        .save(&session_path)
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&session_path).unwrap()).unwrap();
    assert_eq!(value["combinations"], serde_json::json!([[[1], [2]], [[3, 4]]]));
    assert_eq!(value["delimiter"], ",");
    assert_eq!(value["columns"][0]["field_number"], 1);
    assert_eq!(value["columns"][0]["name"], "id");
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_legacy_flat_combinations() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{"csv_file": $DATA, "combinations": [[1, 2], [3]]}"#,
    );

    let config = SessionFile::load(&path)
        .unwrap()
        .into_configuration()
        .unwrap();
    assert_eq!(config.combinations().to_string(), "1:2,3");
}

#[test]
fn test_load_mixed_nested_combinations() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{"csv_file": $DATA, "combinations": [[1, [3, 4]], [[1], [2]]]}"#,
    );

    let config = SessionFile::load(&path)
        .unwrap()
        .into_configuration()
        .unwrap();
    assert_eq!(config.combinations().to_string(), "1:3/4,1:2");

    let report = Fillrate::new(config)
        .with_progress(ProgressConfig::disabled())
        .run()
        .unwrap();
    assert_eq!(report.results[0].valid_rows, 2);
    assert_eq!(report.results[1].valid_rows, 3);
}

#[test]
fn test_load_applies_invalid_values() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{
            "csv_file": $DATA,
            "columns": [
                {"field_number": 1, "invalid_values": []},
                {"field_number": 2, "invalid_values": ["NA"]}
            ],
            "combinations": [[[2]]]
        }"#,
    );

    let config = SessionFile::load(&path)
        .unwrap()
        .into_configuration()
        .unwrap();
    assert_eq!(config.columns().len(), 2);

    let report = Fillrate::new(config)
        .with_progress(ProgressConfig::disabled())
        .run()
        .unwrap();
    assert_eq!(report.results[0].valid_rows, 2);
}

#[test]
fn test_load_keeps_column_names() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{
            "csv_file": $DATA,
            "columns": [
                {"field_number": 1, "name": "Identifier"},
                {"field_number": 3}
            ]
        }"#,
    );

    let config = SessionFile::load(&path)
        .unwrap()
        .into_configuration()
        .unwrap();
    assert_eq!(config.columns().get(1).unwrap().name, "Identifier");
    assert_eq!(config.columns().get(3).unwrap().name, "phone");

    let saved = dir.path().join("resaved.json");
    SessionFile::from_configuration(&config).save(&saved).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(value["columns"][0]["name"], "Identifier");
}

#[test]
fn test_missing_combinations_use_default() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{"csv_file": $DATA, "columns": [{"field_number": 1}, {"field_number": 3}]}"#,
    );

    let config = SessionFile::load(&path)
        .unwrap()
        .into_configuration()
        .unwrap();
    assert_eq!(config.combinations().to_string(), "1:3");
}

#[test]
fn test_unrecognized_entries_are_skipped() {
    let entries: Vec<PersistedCombination> =
        serde_json::from_str(r#"[[1, 2], "oops", {"a": 1}, []]"#).unwrap();
    let kept: Vec<_> = entries
        .iter()
        .filter_map(|entry| entry.to_combination(4).unwrap())
        .collect();

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].to_string(), "1:2");
}

// =============================================================================
// Rejected Sessions
// =============================================================================

#[test]
fn test_header_mismatch_is_rejected() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{"csv_file": $DATA, "headers": ["id", "name", "phone", "mail"]}"#,
    );

    let result = SessionFile::load(&path).unwrap().into_configuration();
    assert!(matches!(result, Err(FillrateError::Config(_))));
}

#[test]
fn test_field_number_out_of_range() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{"csv_file": $DATA, "columns": [{"field_number": 9}]}"#,
    );

    let result = SessionFile::load(&path).unwrap().into_configuration();
    assert!(matches!(result, Err(FillrateError::Config(_))));
}

#[test]
fn test_unselected_column_in_combination() {
    let data = create_test_file(DATA);
    let dir = TempDir::new().unwrap();
    let path = write_session(
        &dir,
        data.path(),
        r#"{"csv_file": $DATA, "columns": [{"field_number": 1}], "combinations": [[1, 2]]}"#,
    );

    let result = SessionFile::load(&path).unwrap().into_configuration();
    assert!(matches!(result, Err(FillrateError::Config(_))));
}

#[test]
fn test_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        SessionFile::load(&path),
        Err(FillrateError::Persistence(_))
    ));
}

#[test]
fn test_missing_session_file() {
    assert!(matches!(
        SessionFile::load("/nonexistent/session.json"),
        Err(FillrateError::Persistence(_))
    ));
}

#[test]
fn test_json_extension() {
    assert_eq!(with_json_extension("run"), Path::new("run.json"));
    assert_eq!(with_json_extension("run.JSON"), Path::new("run.JSON"));
    assert_eq!(with_json_extension("out/run.v2"), Path::new("out/run.v2.json"));
}
