use std::{fs, path::PathBuf};

use labgrade::{
    GradeReport, Grader, Submission,
    constants::{DUE_EPOCH_SECS, FEEDBACK_FILE, GRADE_CSV, SUBMISSION_FILE},
    grade::{CSV_HEADER, append_step_summary, gradescope::write_results_json, write_artifacts},
    history::CommitRecord,
};
use serde_json::Value;
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("labgrade-artifacts-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

fn report_for(content: Option<&str>, commit_epoch: i64) -> GradeReport {
    let submission = Submission::from_content(SUBMISSION_FILE, content);
    let history = [CommitRecord::new(commit_epoch, "Sara", "sara@example.com", "work")];
    Grader::builder()
        .root(".")
        .student_id("sara")
        .build()
        .grade_with(&submission, Some(&history))
}

#[test]
fn artifacts_are_written_and_overwritten() {
    let root = temp_root();
    let artifacts = root.join("artifacts");

    let late = report_for(Some("mongoose.connect(\"mongodb+srv://x\");"), DUE_EPOCH_SECS + 1);
    write_artifacts(&late, &late.to_markdown(None), &artifacts).expect("first write");

    let missing = report_for(None, DUE_EPOCH_SECS - 1);
    write_artifacts(&missing, &missing.to_markdown(None), &artifacts).expect("second write");

    let csv = fs::read_to_string(artifacts.join(GRADE_CSV)).expect("read csv");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(lines.next(), Some("sara,50,100,2"));
    assert_eq!(lines.next(), None);

    let feedback = fs::read_to_string(artifacts.join(FEEDBACK_FILE)).expect("read feedback");
    assert!(feedback.contains("No submission detected"));
    assert!(!feedback.contains("Late submission"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn step_summary_is_appended() {
    let root = temp_root();
    let summary = root.join("summary.md");
    fs::write(&summary, "previous step\n").expect("seed summary");

    let report = report_for(None, DUE_EPOCH_SECS);
    let markdown = report.to_markdown(None);
    append_step_summary(&summary, &markdown);

    let written = fs::read_to_string(&summary).expect("read summary");
    assert!(written.starts_with("previous step\n# Lab | 7-1-mongoDB | Autograding Summary"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn unwritable_step_summary_is_ignored() {
    let root = temp_root();
    let report = report_for(None, DUE_EPOCH_SECS);
    append_step_summary(&root.join("no").join("such").join("dir.md"), &report.to_markdown(None));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn results_json_lists_every_item() {
    let root = temp_root();
    let path = root.join("out").join("results.json");
    let report = report_for(Some("mongoose.connect(\"mongodb+srv://x\");"), DUE_EPOCH_SECS);
    write_results_json(&report, &path).expect("write results");

    let value: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read results")).expect("parse");
    assert_eq!(value["score"], 73.0);
    let tests = value["tests"].as_array().expect("tests array");
    assert_eq!(tests.len(), 8);
    assert_eq!(tests[1]["name"], "TODO 1: Establish Connection with MongoDB via Mongoose");
    assert_eq!(tests[1]["score"], 3.0);
    assert_eq!(tests[7]["name"], "Submission");

    let _ = fs::remove_dir_all(root);
}
