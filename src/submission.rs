#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use crate::normalize::{is_empty_code, normalize};

/// The student's file as seen by the grader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// Where the file was looked for.
    path:       PathBuf,
    /// Whether a regular file existed there.
    has_file:   bool,
    /// Comment-free, single-spaced content. Empty when there is no file.
    normalized: String,
}

impl Submission {
    /// Builds a submission from already loaded content. `None` means the file
    /// does not exist.
    pub fn from_content(path: impl Into<PathBuf>, content: Option<&str>) -> Self {
        Self {
            path:       path.into(),
            has_file:   content.is_some(),
            normalized: content.map(normalize).unwrap_or_default(),
        }
    }

    /// Loads the file at `path`.
    ///
    /// A missing path, a directory, or an unreadable file are all reported as
    /// "no file"; a file that exists but is not valid UTF-8 is read lossily.
    pub async fn load(path: &Path) -> Self {
        let is_file = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.is_file(),
            Err(e) => {
                tracing::debug!("No submission at {}: {e}", path.display());
                false
            }
        };

        if !is_file {
            return Self::from_content(path, None);
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => Self::from_content(path, Some(&String::from_utf8_lossy(&bytes))),
            Err(e) => {
                tracing::warn!("Could not read {}: {e}", path.display());
                Self::from_content(path, None)
            }
        }
    }

    /// Path that was inspected.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file exists.
    pub fn has_file(&self) -> bool {
        self.has_file
    }

    /// Whether the file is missing or holds fewer than the threshold of
    /// meaningful characters.
    pub fn is_empty(&self) -> bool {
        !self.has_file || is_empty_code(&self.normalized)
    }

    /// Whether the rubric can be applied.
    pub fn is_gradable(&self) -> bool {
        self.has_file && !self.is_empty()
    }

    /// Normalized content the signals run against.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// One-line description for the feedback header.
    pub fn note(&self, display_path: &str) -> String {
        if !self.has_file {
            format!("❌ Missing `{display_path}`.")
        } else if self.is_empty() {
            format!("⚠️ Found `{display_path}` but it appears empty (or only comments).")
        } else {
            format!("✅ Found `{display_path}`.")
        }
    }
}
