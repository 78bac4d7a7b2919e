#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt;

use chrono::{DateTime, SecondsFormat};

use crate::{
    constants::{AUTOMATION_FINGERPRINTS, DUE_EPOCH_SECS, DUE_ISO},
    history::CommitRecord,
};

/// Failure to interpret a deadline string.
#[derive(thiserror::Error, Debug)]
pub enum DeadlineError {
    /// The value is not an RFC 3339 timestamp with an explicit offset.
    #[error("`{value}` is not an RFC 3339 timestamp: {source}")]
    Invalid {
        /// The rejected input.
        value:  String,
        /// Why chrono rejected it.
        #[source]
        source: chrono::ParseError,
    },
}

/// A due date, held as absolute epoch seconds together with the text shown to
/// students (which carries the local offset).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deadline {
    /// Seconds since the Unix epoch.
    epoch_secs: i64,
    /// RFC 3339 text with the original offset.
    display:    String,
}

impl Deadline {
    /// The lab's fixed deadline, 2025-11-17 23:59 at UTC+03:00.
    pub fn lab() -> Self {
        Self {
            epoch_secs: DUE_EPOCH_SECS,
            display:    DUE_ISO.to_string(),
        }
    }

    /// Parses an RFC 3339 timestamp such as `2025-11-17T23:59:00+03:00`.
    pub fn parse(value: &str) -> Result<Self, DeadlineError> {
        let parsed =
            DateTime::parse_from_rfc3339(value.trim()).map_err(|source| DeadlineError::Invalid {
                value: value.to_string(),
                source,
            })?;
        Ok(Self {
            epoch_secs: parsed.timestamp(),
            display:    value.trim().to_string(),
        })
    }

    /// Seconds since the Unix epoch.
    pub fn epoch_secs(&self) -> i64 {
        self.epoch_secs
    }

    /// The deadline as originally written, with its offset.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The deadline in UTC, e.g. `2025-11-17T20:59:00.000Z`.
    pub fn utc_iso(&self) -> String {
        epoch_to_iso(Some(self.epoch_secs))
    }

    /// Whether a submission at `epoch_secs` is after the deadline.
    pub fn is_missed_by(&self, epoch_secs: i64) -> bool {
        epoch_secs > self.epoch_secs
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::lab()
    }
}

/// Formats epoch seconds as a UTC ISO timestamp with millisecond precision,
/// or `unknown`.
pub fn epoch_to_iso(epoch_secs: Option<i64>) -> String {
    epoch_secs
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Substrings that mark a commit as machine-generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutomationFilter {
    /// Lowercase markers, matched as plain substrings.
    markers: Vec<String>,
}

impl AutomationFilter {
    /// Builds a filter from arbitrary markers. Matching is case-insensitive.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.into().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Markers in use.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Whether the commit's author, committer or subject carries a marker.
    pub fn is_automated(&self, commit: &CommitRecord) -> bool {
        let haystack = commit.fingerprint_text();
        self.markers.iter().any(|m| haystack.contains(m.as_str()))
    }
}

impl Default for AutomationFilter {
    fn default() -> Self {
        Self::new(AUTOMATION_FINGERPRINTS.iter().copied())
    }
}

/// Final submission state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    /// Latest student commit is on or before the deadline, or unknown.
    OnTime,
    /// Latest student commit is after the deadline.
    Late,
    /// No submission file, or only comments/whitespace.
    Missing,
}

impl SubmissionStatus {
    /// Status code written to the grade record: 0 on time, 1 late, 2 missing.
    pub fn code(self) -> u8 {
        match self {
            SubmissionStatus::OnTime => 0,
            SubmissionStatus::Late => 1,
            SubmissionStatus::Missing => 2,
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::OnTime => write!(f, "on time"),
            SubmissionStatus::Late => write!(f, "late"),
            SubmissionStatus::Missing => write!(f, "missing"),
        }
    }
}

/// Result of classifying a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeliness {
    /// Resolved status.
    pub status:       SubmissionStatus,
    /// Authoritative commit time, if one could be determined.
    pub commit_epoch: Option<i64>,
}

/// Picks the commit time that decides lateness.
///
/// `history` is most-recent-first and only its first `limit` commits are
/// looked at. The first commit in that window not flagged by `filter` wins;
/// when every commit in it is automated the most recent one is used. An
/// empty history yields `None`.
pub fn authoritative_timestamp(
    history: &[CommitRecord],
    filter: &AutomationFilter,
    limit: usize,
) -> Option<i64> {
    let window = &history[..history.len().min(limit)];
    if window.len() < history.len() {
        tracing::debug!(
            inspected = window.len(),
            available = history.len(),
            "history truncated to the inspection window"
        );
    }

    for commit in window {
        if filter.is_automated(commit) {
            tracing::debug!(
                author = %commit.author_name,
                subject = %commit.subject,
                "skipping automated commit"
            );
            continue;
        }
        return Some(commit.epoch_secs);
    }

    let fallback = window.first().map(|c| c.epoch_secs);
    if fallback.is_some() {
        tracing::debug!("every inspected commit looks automated, using the most recent one");
    }
    fallback
}

/// Decides whether the submission is on time, late, or missing.
///
/// `history` is `None` when the log could not be read at all; at most
/// `limit` of its commits are inspected. An unknown commit time never makes
/// a submission late.
pub fn classify(
    history: Option<&[CommitRecord]>,
    filter: &AutomationFilter,
    limit: usize,
    deadline: &Deadline,
    has_file: bool,
    is_empty: bool,
) -> Timeliness {
    let commit_epoch = history.and_then(|h| authoritative_timestamp(h, filter, limit));

    let status = if !has_file || is_empty {
        SubmissionStatus::Missing
    } else if commit_epoch.is_some_and(|secs| deadline.is_missed_by(secs)) {
        SubmissionStatus::Late
    } else {
        SubmissionStatus::OnTime
    };

    Timeliness {
        status,
        commit_epoch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_deadline_matches_its_text() {
        let parsed = Deadline::parse(DUE_ISO).expect("parse lab deadline");
        assert_eq!(parsed, Deadline::lab());
        assert_eq!(Deadline::lab().utc_iso(), "2025-11-17T20:59:00.000Z");
    }

    #[test]
    fn rejects_deadline_without_offset() {
        assert!(Deadline::parse("2025-11-17 23:59").is_err());
    }

    #[test]
    fn deadline_second_is_still_on_time() {
        let deadline = Deadline::lab();
        assert!(!deadline.is_missed_by(DUE_EPOCH_SECS));
        assert!(deadline.is_missed_by(DUE_EPOCH_SECS + 1));
    }

    #[test]
    fn unknown_time_formats_as_unknown() {
        assert_eq!(epoch_to_iso(None), "unknown");
    }

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(SubmissionStatus::OnTime.code(), 0);
        assert_eq!(SubmissionStatus::Late.code(), 1);
        assert_eq!(SubmissionStatus::Missing.code(), 2);
    }

    fn human(epoch_secs: i64) -> CommitRecord {
        CommitRecord::new(epoch_secs, "Sara Ali", "sara@example.com", "Finish TODO 6")
    }

    #[test]
    fn each_default_marker_flags_a_commit_on_its_own() {
        let filter = AutomationFilter::default();
        let cases = [
            ("[bot]", CommitRecord::new(1, "renovate[bot]", "sara@example.com", "Finish TODO 6")),
            ("github-actions", CommitRecord::new(1, "github-actions", "sara@example.com", "Finish TODO 6")),
            ("actions@github.com", CommitRecord::new(1, "Sara Ali", "actions@github.com", "Finish TODO 6")),
            ("github classroom", CommitRecord::new(1, "GitHub Classroom", "sara@example.com", "Finish TODO 6")),
            ("classroom[bot]", CommitRecord::new(1, "Sara Ali", "sara@example.com", "merge classroom[bot] feedback")),
            ("dependabot", CommitRecord::new(1, "Sara Ali", "dependabot@example.com", "Finish TODO 6")),
            ("autograding", CommitRecord::new(1, "Sara Ali", "sara@example.com", "Autograding results")),
            ("workflow", CommitRecord::new(1, "Sara Ali", "sara@example.com", "update workflow")),
        ];

        assert_eq!(filter.markers().len(), cases.len());
        for (marker, commit) in &cases {
            assert!(filter.markers().iter().any(|m| m.as_str() == *marker), "{marker} is a default marker");
            assert!(filter.is_automated(commit), "{marker} should flag {commit:?}");
        }
        assert!(!filter.is_automated(&human(1)));
    }

    #[test]
    fn committer_fields_are_checked() {
        let mut commit = human(1);
        commit.committer_name = "GitHub Actions".to_string();
        commit.committer_email = "41898282+github-actions[bot]@users.noreply.github.com".to_string();
        assert!(AutomationFilter::default().is_automated(&commit));
    }

    #[test]
    fn commits_past_the_window_are_ignored() {
        let bot = CommitRecord::new(DUE_EPOCH_SECS + 100, "github-classroom[bot]", "bot@example.com", "sync");
        let mut history = vec![bot; 450];
        history.push(human(DUE_EPOCH_SECS - 100));

        let filter = AutomationFilter::default();
        assert_eq!(authoritative_timestamp(&history, &filter, 400), Some(DUE_EPOCH_SECS + 100));
        assert_eq!(authoritative_timestamp(&history, &filter, 451), Some(DUE_EPOCH_SECS - 100));

        let timeliness = classify(Some(history.as_slice()), &filter, 400, &Deadline::lab(), true, false);
        assert_eq!(timeliness.status, SubmissionStatus::Late);
    }

    #[test]
    fn zero_window_is_indeterminate() {
        let history = [human(DUE_EPOCH_SECS + 1)];
        let timeliness =
            classify(Some(history.as_slice()), &AutomationFilter::default(), 0, &Deadline::lab(), true, false);
        assert_eq!(timeliness.commit_epoch, None);
        assert_eq!(timeliness.status, SubmissionStatus::OnTime);
    }

    #[test]
    fn custom_markers_are_lowercased() {
        let filter = AutomationFilter::new(["Grader-Bot", ""]);
        assert_eq!(filter.markers(), ["grader-bot".to_string()]);
    }
}
