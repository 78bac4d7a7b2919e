#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # labgrade
//!
//! Grades the MongoDB + Mongoose lab from inside the student's repository,
//! typically as a GitHub Actions step.
//!
//! `labgrade grade` writes `artifacts/grade.csv` and
//! `artifacts/feedback/README.md`, appends the feedback to the step summary
//! when `GITHUB_STEP_SUMMARY` is set, and prints a one-line result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use labgrade::{
    GraderEnv, Grader, Submission,
    constants::ARTIFACTS_DIR,
    grade::{
        append_step_summary, evaluate_tasks, gradescope::write_results_json, signals::ALL_SIGNALS,
        timeliness::epoch_to_iso, write_artifacts,
    },
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Options for the `grade` subcommand.
#[derive(Debug, Clone)]
struct GradeOpts {
    /// Repository root.
    root:         PathBuf,
    /// Where to write artifacts; defaults to `<root>/artifacts`.
    artifacts:    Option<PathBuf>,
    /// Optional Gradescope-style results file.
    results_json: Option<PathBuf>,
    /// Skip the console table.
    no_table:     bool,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade the repository
    Grade(GradeOpts),
    /// Run the rubric on one file
    Check(PathBuf),
    /// List the signal patterns
    Signals,
}

/// Parse the command line arguments into a command and a verbosity flag
fn options() -> (Cmd, bool) {
    /// parses the repository root
    fn root() -> impl Parser<PathBuf> {
        long("root")
            .help("Repository root holding the lab folder and .git")
            .argument::<PathBuf>("DIR")
            .fallback(PathBuf::from("."))
    }

    /// parses the artifacts directory
    fn artifacts() -> impl Parser<Option<PathBuf>> {
        long("artifacts")
            .help("Directory for grade.csv and feedback/README.md")
            .argument::<PathBuf>("DIR")
            .optional()
    }

    /// parses the results JSON path
    fn results_json() -> impl Parser<Option<PathBuf>> {
        long("results-json")
            .help("Also write a Gradescope-style results file")
            .argument::<PathBuf>("PATH")
            .optional()
    }

    /// parses the table toggle
    fn no_table() -> impl Parser<bool> {
        long("no-table")
            .help("Do not print the grading table")
            .switch()
    }

    /// parses the file to check
    fn file() -> impl Parser<PathBuf> {
        positional::<PathBuf>("FILE").help("JavaScript file to run the rubric on")
    }

    /// parses the verbosity flag
    fn verbose() -> impl Parser<bool> {
        long("verbose")
            .short('v')
            .help("Show debug logs")
            .switch()
    }

    let grade_opts = construct!(GradeOpts {
        root(),
        artifacts(),
        results_json(),
        no_table()
    });
    let grade = construct!(grade_opts, verbose())
        .map(|(opts, verbose)| (Cmd::Grade(opts), verbose))
        .to_options()
        .command("grade")
        .help("Grade the lab and write artifacts");

    let check = construct!(file(), verbose())
        .map(|(file, verbose)| (Cmd::Check(file), verbose))
        .to_options()
        .command("check")
        .help("Run the rubric on a single file without writing anything");

    let signals = pure((Cmd::Signals, false))
        .to_options()
        .command("signals")
        .help("Print every signal and its patterns");

    let cmd = construct!([grade, check, signals]);

    cmd.to_options()
        .descr("Autograder for the MongoDB + Mongoose lab")
        .run()
}

/// Grades the repository and writes every artifact.
async fn grade(opts: GradeOpts) -> Result<()> {
    let env = GraderEnv::from_env();
    let grader = Grader::builder()
        .root(opts.root.clone())
        .student_id(env.student_id())
        .deadline(env.deadline())
        .git_timeout(env.git_timeout())
        .build();

    let report = grader.grade().await;
    let run_at = epoch_to_iso(Some(chrono::Utc::now().timestamp()));
    let markdown = report.to_markdown(Some(&run_at));

    if let Some(summary) = env.step_summary() {
        append_step_summary(summary, &markdown);
    }

    let artifacts = opts.artifacts.unwrap_or_else(|| opts.root.join(ARTIFACTS_DIR));
    write_artifacts(&report, &markdown, &artifacts)
        .with_context(|| format!("Failed to write artifacts to {}", artifacts.display()))?;

    if let Some(path) = opts.results_json {
        write_results_json(&report, &path)?;
    }

    if !opts.no_table {
        eprintln!("{}", report.to_table());
    }
    println!("{}", report.console_line());
    Ok(())
}

/// Prints the rubric outcome for a single file.
async fn check(path: PathBuf) -> Result<()> {
    let submission = Submission::load(&path).await;
    eprintln!("{}", submission.note(&path.display().to_string()));

    let tasks = evaluate_tasks(submission.normalized(), submission.is_gradable());
    let mut earned = 0;
    let mut max = 0;
    for task in &tasks {
        earned += task.earned;
        max += task.max_marks;
        let marks = format!("{}/{}", task.earned, task.max_marks);
        let marks = if task.earned == task.max_marks {
            marks.green()
        } else {
            marks.yellow()
        };
        println!("{} {}: {}", marks.bold(), task.id, task.name);
        for requirement in &task.requirements {
            println!("    {}", requirement.to_markdown());
        }
    }
    println!("{}", format!("Mongoose TODOs: {earned}/{max}").bold());
    Ok(())
}

/// Prints every signal with its rule.
fn signals() {
    for signal in ALL_SIGNALS {
        println!("{}", signal.name.bold());
        println!("    {}", signal.rule);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let (cmd, verbose) = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(if verbose { Level::DEBUG } else { Level::INFO });
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match cmd {
        Cmd::Grade(opts) => grade(opts).await?,
        Cmd::Check(path) => check(path).await?,
        Cmd::Signals => signals(),
    };

    Ok(())
}
