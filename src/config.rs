#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, time::Duration};

use crate::{
    constants::{FALLBACK_STUDENT_ID, GIT_TIMEOUT_SECS},
    grade::timeliness::Deadline,
};

/// Settings the grader picks up from its CI environment.
///
/// Blank variables are treated as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraderEnv {
    /// `STUDENT_USERNAME`, an explicit identity override.
    student_username: Option<String>,
    /// `GITHUB_REPOSITORY`, in `org/repo` form.
    repository:       Option<String>,
    /// `GITHUB_ACTOR`, whoever triggered the run.
    actor:            Option<String>,
    /// `GITHUB_STEP_SUMMARY`, file the narrative is appended to.
    step_summary:     Option<PathBuf>,
    /// `LABGRADE_GIT_TIMEOUT_SECS`.
    git_timeout:      Option<Duration>,
    /// `LABGRADE_DUE`, an RFC 3339 override of the lab deadline.
    deadline:         Option<Deadline>,
}

impl GraderEnv {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let git_timeout = get("LABGRADE_GIT_TIMEOUT_SECS").and_then(|raw| match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                tracing::warn!("Ignoring LABGRADE_GIT_TIMEOUT_SECS={raw:?}: expected a positive integer");
                None
            }
        });

        let deadline = get("LABGRADE_DUE").and_then(|raw| match Deadline::parse(&raw) {
            Ok(deadline) => Some(deadline),
            Err(e) => {
                tracing::warn!("Ignoring LABGRADE_DUE: {e}");
                None
            }
        });

        Self {
            student_username: get("STUDENT_USERNAME"),
            repository: get("GITHUB_REPOSITORY"),
            actor: get("GITHUB_ACTOR"),
            step_summary: get("GITHUB_STEP_SUMMARY").map(PathBuf::from),
            git_timeout,
            deadline,
        }
    }

    /// Repository name without the owner, e.g. `lab-7-1-sara` for
    /// `org/lab-7-1-sara`.
    pub fn repo_name(&self) -> Option<&str> {
        let repo = self.repository.as_deref()?;
        let name = repo.rsplit('/').next().unwrap_or(repo);
        (!name.is_empty()).then_some(name)
    }

    /// Identity written to the grade record.
    ///
    /// Priority: `STUDENT_USERNAME`, then the part of the repository name
    /// after its last `-`, then `GITHUB_ACTOR`, then the repository name,
    /// then a fixed placeholder.
    pub fn student_id(&self) -> String {
        let repo_suffix = self
            .repo_name()
            .and_then(|name| name.rsplit_once('-'))
            .map(|(_, suffix)| suffix)
            .filter(|suffix| !suffix.is_empty());

        self.student_username
            .as_deref()
            .or(repo_suffix)
            .or(self.actor.as_deref())
            .or(self.repo_name())
            .unwrap_or(FALLBACK_STUDENT_ID)
            .to_string()
    }

    /// Step summary file, when running under GitHub Actions.
    pub fn step_summary(&self) -> Option<&PathBuf> {
        self.step_summary.as_ref()
    }

    /// Timeout for the history query.
    pub fn git_timeout(&self) -> Duration {
        self.git_timeout
            .unwrap_or(Duration::from_secs(GIT_TIMEOUT_SECS))
    }

    /// Deadline in effect: the override if present, the lab's otherwise.
    pub fn deadline(&self) -> Deadline {
        self.deadline.clone().unwrap_or_default()
    }
}
