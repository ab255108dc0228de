use anyhow::Result;
use docstream::{PipelineKind, RunSummary, StreamConfig, DEFAULT_BUFFER_SIZE};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn partial_file_falls_back_to_defaults() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("docstream.json");
    fs::write(&path, r#"{ "doc_root": "/srv/doc", "word_delay_ms": 40 }"#)?;

    let config = StreamConfig::from_json_file(&path)?;

    assert_eq!(config.doc_root, PathBuf::from("/srv/doc"));
    assert_eq!(config.word_delay(), Duration::from_millis(40));
    assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    assert_eq!(config.extension, "txt");
    assert_eq!(config.csv_delimiter, ',');
    Ok(())
}

#[test]
fn unknown_field_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("docstream.json");
    fs::write(&path, r#"{ "bufer_size": 1024 }"#)?;

    let err = StreamConfig::from_json_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("bufer_size"), "{err:#}");
    Ok(())
}

#[test]
fn invalid_values_fail_validation() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("docstream.json");
    fs::write(&path, r#"{ "buffer_size": 0 }"#)?;

    let err = StreamConfig::from_json_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("buffer_size"), "{err:#}");
    Ok(())
}

#[test]
fn missing_file_names_the_path() {
    let err = StreamConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here.json"));
}

#[test]
fn summary_is_saved_as_json() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("summary.json");
    let mut summary = RunSummary::new(PipelineKind::FilterTransform);
    summary.records_read = 3;
    summary.records_emitted = 2;
    summary.elapsed = Duration::from_millis(12);

    summary.save_to_file(&path)?;

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(v["kind"], "filter-transform");
    assert_eq!(v["records_emitted"], 2);
    assert_eq!(v["elapsed_ms"], 12);
    Ok(())
}
