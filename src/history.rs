#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{ffi::OsString, path::Path, time::Duration};

use crate::process::{self, ProcessError};

/// `git log` pretty format: commit time, author, committer, subject.
pub const GIT_LOG_FORMAT: &str = "%ct|%an|%ae|%cn|%ce|%s";

/// Metadata of a single commit, as reported by `git log`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRecord {
    /// Committer timestamp, seconds since the Unix epoch.
    pub epoch_secs:      i64,
    /// Author name.
    pub author_name:     String,
    /// Author email.
    pub author_email:    String,
    /// Committer name.
    pub committer_name:  String,
    /// Committer email.
    pub committer_email: String,
    /// First line of the commit message.
    pub subject:         String,
}

impl CommitRecord {
    /// Creates a record where author and committer are the same person.
    pub fn new(
        epoch_secs: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let email = email.into();
        Self {
            epoch_secs,
            author_name: name.clone(),
            author_email: email.clone(),
            committer_name: name,
            committer_email: email,
            subject: subject.into(),
        }
    }

    /// Parses one line produced with [`GIT_LOG_FORMAT`].
    ///
    /// The subject may itself contain `|`. Lines without a numeric timestamp
    /// yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(6, '|');
        let epoch_secs = parts.next()?.trim().parse::<i64>().ok()?;
        let mut next = || parts.next().unwrap_or_default().to_string();

        Some(Self {
            epoch_secs,
            author_name: next(),
            author_email: next(),
            committer_name: next(),
            committer_email: next(),
            subject: next(),
        })
    }

    /// Lowercased text that automation fingerprints are matched against.
    pub fn fingerprint_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.author_name,
            self.author_email,
            self.committer_name,
            self.committer_email,
            self.subject
        )
        .to_lowercase()
    }
}

/// Parses `git log` output, most recent commit first, skipping lines that do
/// not parse.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = CommitRecord::parse_line(line);
            if record.is_none() {
                tracing::debug!(line, "skipping malformed git log line");
            }
            record
        })
        .collect()
}

/// Reasons the commit history could not be read.
#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    /// `git` could not be started or did not finish in time.
    #[error("could not run git: {0}")]
    Process(#[from] ProcessError),
    /// `git log` exited unsuccessfully, e.g. outside a repository.
    #[error("git log failed ({status}): {stderr}")]
    GitFailed {
        /// Exit status description.
        status: String,
        /// What git printed on stderr.
        stderr: String,
    },
}

/// Reads at most `limit` commits from the repository at `root`, most recent
/// first.
pub async fn read_git_history(
    root: &Path,
    limit: usize,
    timeout: Duration,
) -> Result<Vec<CommitRecord>, HistoryError> {
    let args: Vec<OsString> = vec![
        "log".into(),
        format!("--format={GIT_LOG_FORMAT}").into(),
        "-n".into(),
        limit.to_string().into(),
    ];

    let out = process::run_collect("git", &args, Some(root), Some(timeout)).await?;
    if !out.status.success() {
        return Err(HistoryError::GitFailed {
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }

    Ok(parse_log(&String::from_utf8_lossy(&out.stdout)))
}

/// Like [`read_git_history`], but any failure is logged and reported as
/// `None` so grading can continue with an unknown commit time.
pub async fn read_git_history_or_none(
    root: &Path,
    limit: usize,
    timeout: Duration,
) -> Option<Vec<CommitRecord>> {
    match read_git_history(root, limit, timeout).await {
        Ok(history) => {
            tracing::debug!(commits = history.len(), "read commit history");
            Some(history)
        }
        Err(e) => {
            tracing::warn!("Commit history unavailable, submission time is unknown: {e}");
            None
        }
    }
}
