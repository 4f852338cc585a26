use polars::prelude::{AnyValue, Column, DataFrame};
use proptest::prelude::*;

use panel_model::{DuplicateIpConfig, PipelineConfig, StraightlineGroup};
use panel_quality::{apply_quality_flags, resolve_duplicate_ips, straightline_flags};

fn costs_group() -> Vec<StraightlineGroup> {
    vec![
        StraightlineGroup::new("costs", "likert_costs_"),
        StraightlineGroup::new("identity", "identity_group"),
    ]
}

#[test]
fn straightliner_detection_per_group() {
    let df = DataFrame::new(vec![
        Column::new("likert_costs_1".into(), vec![Some(3.0), Some(1.0), None, Some(2.0)]),
        Column::new("likert_costs_2".into(), vec![Some(3.0), Some(2.0), None, Some(5.0)]),
        Column::new("likert_costs_3".into(), vec![Some(3.0), Some(4.0), None, Some(5.0)]),
        Column::new("identity_group_1".into(), vec![Some("a"), Some("a"), None, Some("a")]),
        Column::new("identity_group_2".into(), vec![Some("b"), Some("b"), None, Some("a")]),
    ])
    .unwrap();
    let flags = straightline_flags(&df, &costs_group());
    // Row 0: all "3" in costs. Row 1: varied everywhere. Row 2: all missing.
    // Row 3: varied costs but a single identity answer.
    assert_eq!(flags.excluded, vec![true, false, false, true]);
    assert_eq!(flags.groups[0].flagged, 1);
    assert_eq!(flags.groups[1].flagged, 1);
}

#[test]
fn group_without_columns_never_flags() {
    let df = DataFrame::new(vec![Column::new("other".into(), vec!["x", "x"])]).unwrap();
    let flags = straightline_flags(&df, &costs_group());
    assert_eq!(flags.excluded, vec![false, false]);
    assert_eq!(flags.groups[0].columns, 0);
}

#[test]
fn duplicate_ip_removes_everyone_on_a_shared_address() {
    let df = DataFrame::new(vec![
        Column::new("id".into(), vec!["1", "2", "3", "4", "5", "6"]),
        Column::new(
            "IPAddress".into(),
            vec![
                Some("1.2.3.4"),
                Some("1.2.3.4"),
                Some("1.2.3.4"),
                Some("5.6.7.8"),
                Some("5.6.7.8"),
                None,
            ],
        ),
    ])
    .unwrap();
    let outcome = resolve_duplicate_ips(&df, &DuplicateIpConfig::default()).unwrap();
    assert_eq!(outcome.rows_before, 6);
    assert_eq!(outcome.rows_after, 3);
    assert_eq!(outcome.shared.len(), 1);
    assert_eq!(outcome.shared[0].ip, "1.2.3.4");
    let ids: Vec<AnyValue> = (0..3)
        .map(|idx| outcome.frame.column("id").unwrap().get(idx).unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![AnyValue::String("4"), AnyValue::String("5"), AnyValue::String("6")]
    );
}

#[test]
fn duplicate_ip_counts_identities_not_rows() {
    let df = DataFrame::new(vec![
        Column::new("id".into(), vec!["1", "1", "1", "2"]),
        Column::new("IPAddress".into(), vec!["9.9.9.9"; 4]),
    ])
    .unwrap();
    let outcome = resolve_duplicate_ips(&df, &DuplicateIpConfig::default()).unwrap();
    assert_eq!(outcome.rows_after, 4);
}

#[test]
fn duplicate_ip_without_columns_is_skipped() {
    let df = DataFrame::new(vec![Column::new("id".into(), vec!["1"])]).unwrap();
    let outcome = resolve_duplicate_ips(&df, &DuplicateIpConfig::default()).unwrap();
    assert_eq!(outcome.rows_after, 1);
    assert_eq!(outcome.diagnostics.len(), 1);
}

#[test]
fn snapshot_flags_are_combined_once() {
    // 20 respondents, durations 1..=20; respondent 10 also straightlines and
    // respondent 11 fails the attention check.
    let height = 20usize;
    let durations: Vec<String> = (1..=height).map(|v| v.to_string()).collect();
    let costs_1: Vec<f64> = (0..height).map(|idx| if idx == 9 { 4.0 } else { 1.0 }).collect();
    let costs_2: Vec<f64> = (0..height).map(|idx| if idx == 9 { 4.0 } else { 2.0 }).collect();
    let attention: Vec<&str> = (0..height)
        .map(|idx| if idx == 10 { "Disagree" } else { "Agree" })
        .collect();
    let df = DataFrame::new(vec![
        Column::new("Duration(inseconds)".into(), durations),
        Column::new("likert_costs_1".into(), costs_1),
        Column::new("likert_costs_2".into(), costs_2),
        Column::new("attention_check".into(), attention),
    ])
    .unwrap();
    let outcome = apply_quality_flags(&df, &PipelineConfig::default()).unwrap();
    // Bounds are 1.95 and 19.05: respondents 1 and 20 are outliers.
    assert_eq!(outcome.flags.speed.iter().filter(|f| **f).count(), 2);
    assert_eq!(outcome.rows_after, 16);
    assert!(outcome.frame.column("duration").is_ok());
    assert!(outcome.frame.column("Duration(inseconds)").is_err());
}

proptest! {
    #[test]
    fn single_valued_rows_flag_and_varied_rows_do_not(
        rows in prop::collection::vec((1i32..=6, 1i32..=6, 1i32..=6), 1..30)
    ) {
        let columns: Vec<Column> = (0..3)
            .map(|pos| {
                let values: Vec<i32> = rows
                    .iter()
                    .map(|row| match pos { 0 => row.0, 1 => row.1, _ => row.2 })
                    .collect();
                Column::new(format!("likert_costs_{pos}").into(), values)
            })
            .collect();
        let df = DataFrame::new(columns).unwrap();
        let flags = straightline_flags(&df, &costs_group());
        for (row, flag) in rows.iter().zip(&flags.excluded) {
            let uniform = row.0 == row.1 && row.1 == row.2;
            prop_assert_eq!(*flag, uniform);
        }
    }
}
