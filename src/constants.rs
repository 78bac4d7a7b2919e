#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Display name of the lab being graded.
pub const LAB_NAME: &str = "7-1-mongoDB";

/// Path of the graded file, relative to the repository root.
pub const SUBMISSION_FILE: &str = "7-1-mongodb/server.js";

/// Directory all artifacts are written under, relative to the repository root.
pub const ARTIFACTS_DIR: &str = "artifacts";

/// File name of the structured grade record inside [`ARTIFACTS_DIR`].
pub const GRADE_CSV: &str = "grade.csv";

/// Location of the narrative feedback inside [`ARTIFACTS_DIR`].
pub const FEEDBACK_FILE: &str = "feedback/README.md";

/// Due date as shown to students: 17 Nov 2025 11:59 PM Riyadh time.
pub const DUE_ISO: &str = "2025-11-17T23:59:00+03:00";

/// [`DUE_ISO`] as absolute seconds since the Unix epoch.
pub const DUE_EPOCH_SECS: i64 = 1_763_413_140;

/// Part A (MongoDB Cloud) marks, awarded to everyone.
pub const CLOUD_MAX: u32 = 50;

/// Part B (Mongoose TODO 1..6) marks, 6 TODOs x 5 marks.
pub const MONGOOSE_MAX: u32 = 30;

/// Marks for submitting on time. Late submissions get half.
pub const SUBMISSION_MAX: u32 = 20;

/// Overall maximum; totals are clamped to this.
pub const TOTAL_MAX: u32 = 100;

/// Normalized submissions shorter than this many characters count as empty.
pub const EMPTY_CODE_THRESHOLD: usize = 10;

/// Maximum number of commits inspected when looking for the student's commit.
pub const HISTORY_LIMIT: usize = 400;

/// Default timeout for the `git log` query, in seconds.
pub const GIT_TIMEOUT_SECS: u64 = 10;

/// Fallback identifier when no identity hint is available.
pub const FALLBACK_STUDENT_ID: &str = "student";

/// Lowercase markers identifying commits made by bots, workflows or
/// classroom automation.
pub const AUTOMATION_FINGERPRINTS: &[&str] = &[
    "[bot]",
    "github-actions",
    "actions@github.com",
    "github classroom",
    "classroom[bot]",
    "dependabot",
    "autograding",
    "workflow",
];
