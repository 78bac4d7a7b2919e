#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::results::GradeReport;

/// Output format of a text field in the results file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeOutputFormat {
    /// Plain text.
    Text,
    /// Markdown.
    Md,
}

/// Who may see a result.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeVisibility {
    /// Hidden from students.
    Hidden,
    /// Visible after grades are published.
    AfterPublished,
    /// Always visible.
    Visible,
}

/// Pass/fail marker of a test case.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeStatus {
    /// Full marks.
    Passed,
    /// Anything less.
    Failed,
}

/// Top-level results document.
#[derive(Serialize, Deserialize, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
pub struct GradescopeSubmission {
    /// Overall score; overrides the sum of test cases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Text shown above the test cases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Format of `output`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<GradescopeOutputFormat>,

    /// Default format for test case outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_output_format: Option<GradescopeOutputFormat>,

    /// Visibility of the whole submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<GradescopeVisibility>,

    /// Grading metadata kept alongside the score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<serde_json::Value>,

    /// One entry per graded item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<GradescopeTestCase>>,
}

/// A graded item.
#[derive(Serialize, Deserialize, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
pub struct GradescopeTestCase {
    /// Marks earned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Marks available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,

    /// Passed when all marks were earned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GradescopeStatus>,

    /// Item name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Ordering key, e.g. `2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    /// Requirement checklist or explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Format of `output`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<GradescopeOutputFormat>,

    /// Visibility of this item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<GradescopeVisibility>,
}

/// Builds one test case.
fn test_case(number: usize, name: String, score: u32, max: u32, output: String) -> GradescopeTestCase {
    GradescopeTestCase::builder()
        .name(name)
        .number(number.to_string())
        .score(f64::from(score))
        .max_score(f64::from(max))
        .status(if score >= max {
            GradescopeStatus::Passed
        } else {
            GradescopeStatus::Failed
        })
        .output(output)
        .output_format(GradescopeOutputFormat::Md)
        .visibility(GradescopeVisibility::Visible)
        .build()
}

impl GradeReport {
    /// Converts the report into a results document: the cloud part, one
    /// test case per task, then the submission marks.
    pub fn to_gradescope(&self) -> GradescopeSubmission {
        let mut tests = vec![test_case(
            1,
            "Part A: MongoDB Cloud".to_string(),
            self.cloud_marks,
            self.scheme.cloud_marks,
            "- ✅ Full marks awarded automatically".to_string(),
        )];

        for task in &self.tasks {
            let checklist = task
                .requirements
                .iter()
                .map(|r| r.to_markdown())
                .join("\n");
            tests.push(test_case(
                tests.len() + 1,
                format!("{}: {}", task.id, task.name),
                task.earned,
                task.max_marks,
                checklist,
            ));
        }

        tests.push(test_case(
            tests.len() + 1,
            "Submission".to_string(),
            self.submission_marks,
            self.scheme.submission_max,
            self.status_sentence(),
        ));

        GradescopeSubmission::builder()
            .score(f64::from(self.total))
            .output(self.console_line())
            .output_format(GradescopeOutputFormat::Text)
            .test_output_format(GradescopeOutputFormat::Md)
            .visibility(GradescopeVisibility::Visible)
            .extra_data(serde_json::json!({
                "student": self.student_id(),
                "status": self.status_code(),
                "commit_epoch": self.submission.commit_epoch,
                "deadline": self.deadline.display(),
            }))
            .tests(tests)
            .build()
    }
}

/// Writes the results document as pretty JSON.
pub fn write_results_json(report: &GradeReport, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&report.to_gradescope())
        .context("Could not serialize results")?;
    std::fs::write(path, json).with_context(|| format!("Could not write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::SUBMISSION_FILE,
        grade::{
            results::{MarkScheme, SubmissionRecord, aggregate},
            rubric::{Requirement, TaskResult},
            timeliness::{Deadline, SubmissionStatus, Timeliness},
        },
        submission::Submission,
    };

    #[test]
    fn one_case_per_item() {
        let submission = Submission::from_content(SUBMISSION_FILE, None);
        let record = SubmissionRecord::new("sara", &submission, Timeliness {
            status:       SubmissionStatus::Missing,
            commit_epoch: None,
        });
        let task = TaskResult {
            id:           "TODO 1".to_string(),
            name:         "Connect".to_string(),
            earned:       5,
            max_marks:    5,
            requirements: vec![Requirement::new("x", true, "")],
        };
        let report = aggregate(MarkScheme::default(), record, vec![task], Deadline::lab());
        let doc = report.to_gradescope();

        assert_eq!(doc.score, Some(50.0));
        let tests = doc.tests.expect("tests");
        assert_eq!(tests.len(), 3);
        assert_eq!(tests[1].name.as_deref(), Some("TODO 1: Connect"));
        assert_eq!(tests[1].score, Some(0.0));
        assert_eq!(tests[1].status, Some(GradescopeStatus::Failed));
        assert_eq!(tests[2].number.as_deref(), Some("3"));

        let json = serde_json::to_value(report.to_gradescope()).expect("serialize");
        assert_eq!(json["extra_data"]["status"], 2);
        assert_eq!(json["tests"][0]["status"], "passed");
    }
}
