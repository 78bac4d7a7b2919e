//! # labgrade
//!
//! Autograder for the MongoDB + Mongoose lab. Looks for recognizable idioms
//! in the student's `server.js`, decides whether the latest student commit
//! made the deadline, and writes a grade record plus a feedback narrative.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Configuration from the CI environment
pub mod config;
/// Fixed values describing the lab
pub mod constants;
/// Rubric, timeliness and reporting
pub mod grade;
/// Reading commit metadata from git
pub mod history;
/// Comment stripping and whitespace compaction
pub mod normalize;
/// Running subprocesses with a timeout
pub mod process;
/// Loading the student's file
pub mod submission;

pub use config::GraderEnv;
pub use grade::{GradeReport, Grader};
pub use submission::Submission;
