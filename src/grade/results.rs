#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bon::Builder;
use tabled::Tabled;

use super::{
    rubric::TaskResult,
    timeliness::{Deadline, SubmissionStatus, Timeliness},
};
use crate::{
    constants::{CLOUD_MAX, MONGOOSE_MAX, SUBMISSION_FILE, SUBMISSION_MAX, TOTAL_MAX},
    submission::Submission,
};

/// How marks are split between the parts of the lab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
pub struct MarkScheme {
    /// Part A, awarded unconditionally.
    #[builder(default = CLOUD_MAX)]
    pub cloud_marks:    u32,
    /// Part B maximum, shown in the breakdown.
    #[builder(default = MONGOOSE_MAX)]
    pub mongoose_max:   u32,
    /// Marks for an on-time submission.
    #[builder(default = SUBMISSION_MAX)]
    pub submission_max: u32,
    /// Ceiling for the total.
    #[builder(default = TOTAL_MAX)]
    pub total_max:      u32,
}

impl Default for MarkScheme {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MarkScheme {
    /// Fixed tier for a status: full, half, or nothing.
    pub fn submission_marks(&self, status: SubmissionStatus) -> u32 {
        match status {
            SubmissionStatus::OnTime => self.submission_max,
            SubmissionStatus::Late => self.submission_max / 2,
            SubmissionStatus::Missing => 0,
        }
    }
}

/// Facts about the submission itself, independent of the rubric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Who was graded.
    pub student_id:   String,
    /// Whether the submission file exists.
    pub has_file:     bool,
    /// Whether it is missing or has too little code.
    pub is_empty:     bool,
    /// Authoritative commit time, if known.
    pub commit_epoch: Option<i64>,
    /// Submission state.
    pub status:       SubmissionStatus,
    /// Found / empty / missing line for the feedback header.
    pub note:         String,
}

impl SubmissionRecord {
    /// Combines what was found on disk with the timeliness decision.
    pub fn new(student_id: impl Into<String>, submission: &Submission, timeliness: Timeliness) -> Self {
        Self {
            student_id:   student_id.into(),
            has_file:     submission.has_file(),
            is_empty:     submission.is_empty(),
            commit_epoch: timeliness.commit_epoch,
            status:       timeliness.status,
            note:         submission.note(SUBMISSION_FILE),
        }
    }
}

/// Everything known about a graded submission. Built once by [`aggregate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradeReport {
    /// The submission being graded.
    pub submission:       SubmissionRecord,
    /// Split of marks used.
    pub scheme:           MarkScheme,
    /// Part A marks.
    pub cloud_marks:      u32,
    /// One entry per rubric task.
    pub tasks:            Vec<TaskResult>,
    /// Sum of task marks.
    pub task_marks:       u32,
    /// Marks for timeliness.
    pub submission_marks: u32,
    /// Grand total, never above `scheme.total_max`.
    pub total:            u32,
    /// The deadline used.
    pub deadline:         Deadline,
}

/// Combines task results and timeliness into a report.
///
/// Task marks are zeroed when the submission is missing, and the total is
/// clamped to the scheme's maximum.
pub fn aggregate(
    scheme: MarkScheme,
    submission: SubmissionRecord,
    tasks: Vec<TaskResult>,
    deadline: Deadline,
) -> GradeReport {
    let tasks: Vec<TaskResult> = if submission.status == SubmissionStatus::Missing {
        tasks.into_iter().map(TaskResult::zeroed).collect()
    } else {
        tasks
    };

    let task_marks: u32 = tasks.iter().map(|t| t.earned.min(t.max_marks)).sum();
    let submission_marks = scheme.submission_marks(submission.status);
    let raw_total = scheme.cloud_marks + task_marks + submission_marks;
    let total = raw_total.min(scheme.total_max);
    if total < raw_total {
        tracing::warn!(raw_total, total, "total clamped to the maximum");
    }

    GradeReport {
        submission,
        scheme,
        cloud_marks: scheme.cloud_marks,
        tasks,
        task_marks,
        submission_marks,
        total,
        deadline,
    }
}

/// A row of the console grading table.
#[derive(Tabled, Clone, Debug, PartialEq, Eq)]
pub struct BreakdownRow {
    /// What the marks are for.
    #[tabled(rename = "Item")]
    pub item:  String,
    /// `earned/max`.
    #[tabled(rename = "Marks")]
    pub marks: String,
}

impl BreakdownRow {
    /// Creates a row.
    pub fn new(item: impl Into<String>, earned: u32, max: u32) -> Self {
        Self {
            item:  item.into(),
            marks: format!("{earned}/{max}"),
        }
    }
}

impl GradeReport {
    /// Who was graded.
    pub fn student_id(&self) -> &str {
        &self.submission.student_id
    }

    /// Submission state.
    pub fn status(&self) -> SubmissionStatus {
        self.submission.status
    }

    /// Status code for the grade record.
    pub fn status_code(&self) -> u8 {
        self.submission.status.code()
    }

    /// Rows of the marks breakdown, in report order.
    pub fn breakdown(&self) -> Vec<BreakdownRow> {
        let mut rows =
            vec![BreakdownRow::new("Part A: MongoDB Cloud (manual / full)", self.cloud_marks, self.scheme.cloud_marks)];
        rows.extend(
            self.tasks
                .iter()
                .map(|t| BreakdownRow::new(format!("{}: {}", t.id, t.name), t.earned, t.max_marks)),
        );
        rows.push(BreakdownRow::new(
            "Part B: Mongoose TODOs total",
            self.task_marks,
            self.scheme.mongoose_max,
        ));
        rows.push(BreakdownRow::new("Submission", self.submission_marks, self.scheme.submission_max));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::rubric::Requirement;

    fn task(id: &str, earned: u32) -> TaskResult {
        TaskResult {
            id:           id.to_string(),
            name:         format!("Task {id}"),
            earned,
            max_marks:    5,
            requirements: vec![Requirement::new("r", earned > 0, "")],
        }
    }

    fn record(status: SubmissionStatus) -> SubmissionRecord {
        let submission = if status == SubmissionStatus::Missing {
            Submission::from_content(SUBMISSION_FILE, None)
        } else {
            Submission::from_content(SUBMISSION_FILE, Some("const mongoose = require('mongoose');"))
        };
        SubmissionRecord::new(
            "s",
            &submission,
            Timeliness {
                status,
                commit_epoch: None,
            },
        )
    }

    #[test]
    fn submission_tiers() {
        let scheme = MarkScheme::default();
        assert_eq!(scheme.submission_marks(SubmissionStatus::OnTime), 20);
        assert_eq!(scheme.submission_marks(SubmissionStatus::Late), 10);
        assert_eq!(scheme.submission_marks(SubmissionStatus::Missing), 0);
    }

    #[test]
    fn missing_zeroes_tasks() {
        let report = aggregate(
            MarkScheme::default(),
            record(SubmissionStatus::Missing),
            vec![task("TODO 1", 5), task("TODO 2", 3)],
            Deadline::lab(),
        );
        assert!(report.tasks.iter().all(|t| t.earned == 0));
        assert_eq!(report.total, 50);
    }

    #[test]
    fn total_is_clamped() {
        let scheme = MarkScheme::builder().cloud_marks(90).build();
        let report = aggregate(
            scheme,
            record(SubmissionStatus::OnTime),
            vec![task("TODO 1", 5), task("TODO 2", 5)],
            Deadline::lab(),
        );
        assert_eq!(report.total, 100);
        assert_eq!(report.task_marks, 10);
    }

    #[test]
    fn late_gets_half_submission() {
        let report = aggregate(
            MarkScheme::default(),
            record(SubmissionStatus::Late),
            vec![task("TODO 1", 4)],
            Deadline::lab(),
        );
        assert_eq!(report.total, 50 + 4 + 10);
        assert_eq!(report.status_code(), 1);
    }

    #[test]
    fn breakdown_lists_every_part() {
        let report = aggregate(
            MarkScheme::default(),
            record(SubmissionStatus::OnTime),
            vec![task("TODO 1", 4)],
            Deadline::lab(),
        );
        let rows = report.breakdown();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], BreakdownRow::new("TODO 1: Task TODO 1", 4, 5));
        assert_eq!(rows[2].marks, "4/30");
        assert_eq!(rows[3].marks, "20/20");
    }
}
