use super::{RowMessage, RowOutcome, RunSummary, SummaryBuilder};

fn build(outcomes: Vec<RowOutcome>) -> RunSummary {
    let mut builder = SummaryBuilder::new();
    builder.extend(outcomes).expect("record outcomes");
    builder.finalize().expect("finalize summary")
}

fn assert_counts_hold(summary: &RunSummary) {
    assert_eq!(
        summary.total_rows,
        summary.success_rows + summary.fail_rows,
        "total must equal success + fail"
    );
    assert_eq!(summary.errors.len(), summary.fail_rows);
    assert_eq!(summary.fail_index.len(), summary.fail_rows);
    for entry in &summary.errors {
        assert!(summary.fail_index.contains(&entry.index));
    }
}

#[test]
fn empty_builder_finalizes_to_empty_summary() {
    let summary = SummaryBuilder::new().finalize().expect("finalize");
    assert_eq!(summary, RunSummary::default());
    assert!(!summary.has_failures());
}

#[test]
fn mixed_outcomes_keep_counts_consistent() {
    let summary = build(vec![
        RowOutcome::Success(3),
        RowOutcome::Error(1, "bad field".to_string()),
        RowOutcome::Warning(3, "no description".to_string()),
        RowOutcome::Success(0),
        RowOutcome::Change(0, "display name updated".to_string()),
        RowOutcome::Error(4, "timeout".to_string()),
        RowOutcome::Success(2),
    ]);

    assert_counts_hold(&summary);
    assert_eq!(summary.total_rows, 5);
    assert_eq!(summary.success_rows, 3);
    assert_eq!(summary.fail_rows, 2);
    assert_eq!(summary.fail_index.iter().copied().collect::<Vec<_>>(), vec![1, 4]);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.changes.len(), 1);
    assert!(summary.has_failures());
}

#[test]
fn many_generated_sequences_satisfy_count_invariants() {
    for seed in 0..64usize {
        let mut outcomes = Vec::new();
        for row in 0..(seed % 11) {
            if (row + seed) % 3 == 0 {
                outcomes.push(RowOutcome::Error(row, format!("row {row} failed")));
            } else {
                outcomes.push(RowOutcome::Success(row));
                if (row * seed) % 4 == 1 {
                    outcomes.push(RowOutcome::Warning(row, "check me".to_string()));
                }
                if (row + 2 * seed) % 5 == 0 {
                    outcomes.push(RowOutcome::Change(row, "updated".to_string()));
                }
            }
        }
        outcomes.reverse();
        let summary = build(outcomes);
        assert_counts_hold(&summary);
        assert_eq!(summary.total_rows, seed % 11);
    }
}

#[test]
fn errors_preserve_recording_order() {
    let summary = build(vec![
        RowOutcome::Error(2, "timeout".to_string()),
        RowOutcome::Success(1),
        RowOutcome::Error(0, "bad field".to_string()),
    ]);
    assert_eq!(
        summary.errors,
        vec![
            RowMessage {
                index: 2,
                message: "timeout".to_string()
            },
            RowMessage {
                index: 0,
                message: "bad field".to_string()
            },
        ]
    );
}

#[test]
fn second_terminal_outcome_for_row_is_rejected() {
    let mut builder = SummaryBuilder::new();
    builder.record(RowOutcome::Success(0)).expect("first success");
    let err = builder
        .record(RowOutcome::Error(0, "late failure".to_string()))
        .expect_err("duplicate outcome");
    assert!(err.to_string().contains("row 0"));

    builder
        .record(RowOutcome::Error(1, "bad field".to_string()))
        .expect("first error");
    assert!(builder
        .record(RowOutcome::Error(1, "again".to_string()))
        .is_err());

    let summary = builder.finalize().expect("finalize");
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.errors.len(), 1);
}

#[test]
fn warning_or_change_for_failed_row_is_rejected() {
    let mut builder = SummaryBuilder::new();
    builder
        .record(RowOutcome::Error(5, "bad field".to_string()))
        .expect("error");
    assert!(builder
        .record(RowOutcome::Warning(5, "also odd".to_string()))
        .is_err());
    assert!(builder
        .record(RowOutcome::Change(5, "updated".to_string()))
        .is_err());
    let summary = builder.finalize().expect("finalize");
    assert!(summary.warnings.is_empty());
    assert!(summary.changes.is_empty());
}

#[test]
fn error_after_warning_for_same_row_is_rejected() {
    let mut builder = SummaryBuilder::new();
    builder
        .record(RowOutcome::Warning(7, "no description".to_string()))
        .expect("warning");
    assert!(builder
        .record(RowOutcome::Error(7, "timeout".to_string()))
        .is_err());
}

#[test]
fn warning_recorded_before_success_is_accepted() {
    let summary = build(vec![
        RowOutcome::Warning(0, "no description".to_string()),
        RowOutcome::Success(0),
    ]);
    assert_eq!(summary.success_rows, 1);
    assert_eq!(summary.warnings.len(), 1);
}

#[test]
fn finalize_rejects_change_without_success() {
    let mut builder = SummaryBuilder::new();
    builder
        .record(RowOutcome::Change(9, "updated".to_string()))
        .expect("change");
    let err = builder.finalize().expect_err("orphan change");
    assert!(err.to_string().contains("row 9"));
}

#[test]
fn summary_serializes_with_snake_case_fields() {
    let summary = build(vec![
        RowOutcome::Error(2, "timeout".to_string()),
        RowOutcome::Error(0, "bad field".to_string()),
    ]);
    let value = serde_json::to_value(&summary).expect("serialize summary");
    assert_eq!(value["total_rows"], 2);
    assert_eq!(value["fail_rows"], 2);
    assert_eq!(value["fail_index"], serde_json::json!([0, 2]));
    assert_eq!(value["errors"][0]["index"], 2);
}
