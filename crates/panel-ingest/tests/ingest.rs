use std::fs;
use std::path::PathBuf;

use polars::prelude::{AnyValue, DataType};
use tempfile::TempDir;

use panel_ingest::{IngestError, read_crosswalk, read_wave_csv, write_csv};
use panel_model::CrosswalkConfig;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn wave_export_skips_metadata_rows_and_cleans_headers() {
    let dir = TempDir::new().expect("temp dir");
    let contents = "\
id,Duration (in seconds),attention_check,Q.1
Respondent id,Duration,Attention,Question 1
{\"ImportId\":\"id\"},{\"ImportId\":\"duration\"},{},{}
007,120,Agree,
008,95,Disagree,Yes
";
    let path = write_file(&dir, "wave1.csv", contents);
    let df = read_wave_csv(&path).expect("read wave");

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["id", "Duration(inseconds)", "attention_check", "Q1"]);
    assert_eq!(df.height(), 2);

    let id = df.column("id").unwrap();
    assert_eq!(id.dtype(), &DataType::String);
    assert_eq!(id.get(0).unwrap(), AnyValue::String("007"));
    assert_eq!(df.column("Q1").unwrap().get(0).unwrap(), AnyValue::Null);
}

#[test]
fn wave_export_pads_short_rows() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "short.csv", "a,b,c\nm1\nm2\n1,2\n");
    let df = read_wave_csv(&path).expect("read wave");
    assert_eq!(df.height(), 1);
    assert_eq!(df.column("c").unwrap().get(0).unwrap(), AnyValue::Null);
}

#[test]
fn wave_export_rejects_duplicate_clean_headers() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "dup.csv", "Q 1,Q1\nx,y\nx,y\n");
    let err = read_wave_csv(&path).unwrap_err();
    assert!(matches!(err, IngestError::DuplicateHeader { ref column, .. } if column == "Q1"));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_wave_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn crosswalk_reads_nullable_integer_ids() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "ids.csv", "NEW IDS;OLD IDS;note\n1;10;a\n2;;b\n3.0;30;c\n");
    let df = read_crosswalk(&path, &CrosswalkConfig::default()).expect("read crosswalk");
    assert_eq!(df.width(), 2);
    let new_ids = df.column("NEW IDS").unwrap();
    assert_eq!(new_ids.dtype(), &DataType::Int64);
    assert_eq!(new_ids.get(2).unwrap(), AnyValue::Int64(3));
    assert_eq!(df.column("OLD IDS").unwrap().get(1).unwrap(), AnyValue::Null);
}

#[test]
fn crosswalk_requires_identifier_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "ids.csv", "NEW IDS;OTHER\n1;10\n");
    let err = read_crosswalk(&path, &CrosswalkConfig::default()).unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "OLD IDS"));
}

#[test]
fn crosswalk_rejects_non_integer_ids() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "ids.csv", "NEW IDS;OLD IDS\n1;ten\n");
    let err = read_crosswalk(&path, &CrosswalkConfig::default()).unwrap_err();
    assert!(matches!(err, IngestError::InvalidValue { row: 1, .. }));
}

#[test]
fn write_csv_renders_missing_as_empty() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_file(&dir, "in.csv", "id,score\nm\nm\n1,4.0\n2,\n");
    let df = read_wave_csv(&input).expect("read wave");
    let output = dir.path().join("out.csv");
    write_csv(&df, &output).expect("write csv");
    let written = fs::read_to_string(&output).expect("read output");
    assert_eq!(written, "id,score\n1,4.0\n2,\n");
}
