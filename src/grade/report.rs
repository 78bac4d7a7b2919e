#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt, io::Write as _, path::Path};

use anyhow::{Context, Result};
use tabled::{
    Table,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use super::{results::GradeReport, timeliness::SubmissionStatus};
use crate::{
    constants::{DUE_ISO, FEEDBACK_FILE, GRADE_CSV, LAB_NAME},
    grade::timeliness::epoch_to_iso,
};

/// Header of the grade record. Downstream tooling depends on it.
pub const CSV_HEADER: &str = "student_username,obtained_marks,total_marks,status";

impl GradeReport {
    /// The grade record: header plus one row. `total_marks` is always the
    /// scheme's maximum.
    pub fn to_csv(&self) -> String {
        format!(
            "{CSV_HEADER}\n{},{},{},{}\n",
            self.student_id(),
            self.total,
            self.scheme.total_max,
            self.status_code()
        )
    }

    /// One-line outcome for stdout.
    pub fn console_line(&self) -> String {
        format!(
            "✔ Lab graded: {}/{} (status={})",
            self.total,
            self.scheme.total_max,
            self.status_code()
        )
    }

    /// Sentence explaining the submission marks.
    pub fn status_sentence(&self) -> String {
        let max = self.scheme.submission_max;
        let commit = epoch_to_iso(self.submission.commit_epoch);
        let due = self.deadline.utc_iso();
        match self.status() {
            SubmissionStatus::Missing => {
                format!("No submission detected (missing/empty server.js): submission marks = 0/{max}.")
            }
            SubmissionStatus::Late => format!(
                "Late submission: latest *student* commit is after due time. {}/{max}. (student commit: \
                 {commit}; due: {due})",
                self.submission_marks
            ),
            SubmissionStatus::OnTime => format!(
                "On-time submission: latest *student* commit is on/before due time. {}/{max}. \
                 (student commit: {commit}; due: {due})",
                self.submission_marks
            ),
        }
    }

    /// Renders the feedback narrative.
    ///
    /// `run_at` is shown as the run timestamp; leaving it out makes the
    /// output depend on the report alone.
    pub fn to_markdown(&self, run_at: Option<&str>) -> String {
        Narrative { report: self, run_at }.to_string()
    }

    /// Breakdown as a console table.
    pub fn to_table(&self) -> String {
        Table::new(self.breakdown())
            .with(Panel::header(format!("Lab {LAB_NAME}: {}", self.student_id())))
            .with(Panel::footer(format!(
                "Total: {}/{} ({})",
                self.total,
                self.scheme.total_max,
                self.status()
            )))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
            .with(
                Modify::new(Rows::first())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(
                Modify::new(Rows::last())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(Style::modern())
            .to_string()
    }
}

/// Markdown feedback for one report.
struct Narrative<'a> {
    /// Report being rendered.
    report: &'a GradeReport,
    /// Run timestamp line, if any.
    run_at: Option<&'a str>,
}

impl fmt::Display for Narrative<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Narrative { report, run_at } = *self;
        let due_display = if report.deadline.display() == DUE_ISO {
            "Due (Riyadh)"
        } else {
            "Due"
        };

        writeln!(f, "# Lab | {LAB_NAME} | Autograding Summary")?;
        writeln!(f)?;
        writeln!(f, "- Student: `{}`", report.student_id())?;
        writeln!(f, "- {}", report.submission.note)?;
        writeln!(f, "- {}", report.status_sentence())?;
        writeln!(f, "- {due_display}: `{}`", report.deadline.display())?;
        writeln!(
            f,
            "- Status: **{}** (0=on time, 1=late, 2=no submission/empty)",
            report.status_code()
        )?;
        if let Some(run_at) = run_at {
            writeln!(f, "- Run: `{run_at}`")?;
        }

        writeln!(f)?;
        writeln!(f, "## Marks Breakdown")?;
        writeln!(f)?;
        writeln!(f, "| Item | Marks |")?;
        writeln!(f, "|------|------:|")?;
        for row in report.breakdown() {
            writeln!(f, "| {} | {} |", row.item, row.marks)?;
        }

        writeln!(f)?;
        writeln!(f, "## Total Marks")?;
        writeln!(f)?;
        writeln!(f, "**{} / {}**", report.total, report.scheme.total_max)?;
        writeln!(f)?;
        writeln!(f, "## Detailed Feedback")?;

        writeln!(f)?;
        writeln!(f, "## Part A: MongoDB Cloud")?;
        writeln!(
            f,
            "- ✅ Full marks awarded automatically: {}/{}",
            report.cloud_marks, report.scheme.cloud_marks
        )?;

        writeln!(f)?;
        writeln!(f, "## Part B: Mongoose (server.js)")?;
        for task in &report.tasks {
            writeln!(f)?;
            writeln!(f, "### {}: {}", task.id, task.name)?;
            for requirement in &task.requirements {
                writeln!(f, "{}", requirement.to_markdown())?;
            }
        }
        Ok(())
    }
}

/// Writes the grade record and the feedback narrative under `artifacts`,
/// replacing earlier runs.
pub fn write_artifacts(report: &GradeReport, markdown: &str, artifacts: &Path) -> Result<()> {
    let feedback = artifacts.join(FEEDBACK_FILE);
    if let Some(dir) = feedback.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create {}", dir.display()))?;
    }

    let csv = artifacts.join(GRADE_CSV);
    std::fs::write(&csv, report.to_csv())
        .with_context(|| format!("Could not write {}", csv.display()))?;
    std::fs::write(&feedback, markdown)
        .with_context(|| format!("Could not write {}", feedback.display()))?;

    tracing::debug!("Wrote {} and {}", csv.display(), feedback.display());
    Ok(())
}

/// Appends the narrative to the CI step summary. Failures are logged and
/// otherwise ignored.
pub fn append_step_summary(path: &Path, markdown: &str) {
    let appended = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(markdown.as_bytes()));

    if let Err(e) = appended {
        tracing::warn!("Could not append to step summary {}: {e}", path.display());
    }
}
