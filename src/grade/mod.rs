#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Rubric evaluation, timeliness and reporting for the lab.
//!
//! Submission text flows through [`signals`] into the [`rubric`] tasks
//! declared in [`lab`]; commit history is classified separately by
//! [`timeliness`]; [`results`] combines both and [`report`] /
//! [`gradescope`] render the outcome.

/// Gradescope-style results document.
pub mod gradescope;
/// The lab's rubric tasks.
pub mod lab;
/// CSV, Markdown, console and step summary output.
pub mod report;
/// Mark schemes and score aggregation.
pub mod results;
/// Requirement checks and proportional marks.
pub mod rubric;
/// Textual detectors for code idioms.
pub mod signals;
/// On-time, late or missing.
pub mod timeliness;

use std::{path::PathBuf, time::Duration};

use bon::Builder;

pub use self::{
    report::{CSV_HEADER, append_step_summary, write_artifacts},
    results::{GradeReport, MarkScheme, SubmissionRecord, aggregate},
    rubric::{Requirement, TaskResult},
    timeliness::{AutomationFilter, Deadline, SubmissionStatus, Timeliness, classify},
};
use crate::{
    constants::{FALLBACK_STUDENT_ID, GIT_TIMEOUT_SECS, HISTORY_LIMIT, SUBMISSION_FILE},
    history::{CommitRecord, read_git_history_or_none},
    submission::Submission,
};

/// Runs every lab task against normalized code.
pub fn evaluate_tasks(code: &str, gradable: bool) -> Vec<TaskResult> {
    lab::MONGOOSE_TASKS
        .iter()
        .map(|task| rubric::evaluate(task, code, gradable))
        .collect()
}

/// Grades one repository checkout.
#[derive(Clone, Debug, Builder)]
pub struct Grader {
    /// Repository root holding the submission and the git history.
    #[builder(into)]
    root:          PathBuf,
    /// Identity written to the grade record.
    #[builder(into, default = FALLBACK_STUDENT_ID.to_string())]
    student_id:    String,
    /// Marks split.
    #[builder(default)]
    scheme:        MarkScheme,
    /// Which commits are ignored when deciding lateness.
    #[builder(default)]
    filter:        AutomationFilter,
    /// Due date.
    #[builder(default)]
    deadline:      Deadline,
    /// Timeout for `git log`.
    #[builder(default = Duration::from_secs(GIT_TIMEOUT_SECS))]
    git_timeout:   Duration,
    /// Number of commits inspected.
    #[builder(default = HISTORY_LIMIT)]
    history_limit: usize,
}

impl Grader {
    /// Path of the graded file.
    pub fn submission_path(&self) -> PathBuf {
        self.root.join(SUBMISSION_FILE)
    }

    /// Loads the submission and the commit history, then grades.
    ///
    /// Nothing here fails: an unreadable file counts as missing and an
    /// unreadable history leaves the commit time unknown.
    pub async fn grade(&self) -> GradeReport {
        let submission = Submission::load(&self.submission_path()).await;
        let history =
            read_git_history_or_none(&self.root, self.history_limit, self.git_timeout).await;
        self.grade_with(&submission, history.as_deref())
    }

    /// Grades already loaded inputs. `history` is most-recent-first, or
    /// `None` if it could not be read.
    pub fn grade_with(&self, submission: &Submission, history: Option<&[CommitRecord]>) -> GradeReport {
        let timeliness = classify(
            history,
            &self.filter,
            self.history_limit,
            &self.deadline,
            submission.has_file(),
            submission.is_empty(),
        );
        let tasks = evaluate_tasks(submission.normalized(), submission.is_gradable());
        let record = SubmissionRecord::new(self.student_id.clone(), submission, timeliness);
        let report = aggregate(self.scheme, record, tasks, self.deadline.clone());

        tracing::info!(
            student = report.student_id(),
            total = report.total,
            status = report.status_code(),
            "graded submission"
        );
        report
    }
}
