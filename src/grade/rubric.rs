#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::signals::Rule;

/// Label of the synthetic requirement used when nothing can be graded.
pub const UNGRADABLE_LABEL: &str = "No submission / empty server.js → cannot grade Mongoose TODOs";

/// One row of a task's requirement table: what to look for, and what to tell
/// the student when it is missing.
#[derive(Clone, Copy, Debug)]
pub struct Check {
    /// Requirement text shown in feedback.
    pub label: &'static str,
    /// Rule that satisfies the requirement.
    pub rule:  Rule,
    /// Hint shown when the rule does not match.
    pub hint:  &'static str,
}

impl Check {
    /// Runs the rule and records the outcome.
    pub fn evaluate(&self, code: &str) -> Requirement {
        Requirement::new(self.label, self.rule.matches(code), self.hint)
    }
}

/// Definition of a single rubric task (one TODO).
#[derive(Clone, Copy, Debug)]
pub struct TaskSpec {
    /// Short identifier, e.g. `TODO 1`.
    pub id:        &'static str,
    /// Human readable name.
    pub name:      &'static str,
    /// Marks available for the task.
    pub max_marks: u32,
    /// Requirements sharing the task's marks.
    pub checks:    &'static [Check],
}

/// Outcome of one requirement check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    /// Requirement text.
    pub label:        String,
    /// Whether the requirement was satisfied.
    pub satisfied:    bool,
    /// What to do about it when it is not.
    pub failure_hint: String,
}

impl Requirement {
    /// Records a requirement outcome.
    pub fn new(label: impl Into<String>, satisfied: bool, failure_hint: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            satisfied,
            failure_hint: failure_hint.into(),
        }
    }

    /// Renders the requirement as a Markdown list item.
    pub fn to_markdown(&self) -> String {
        if self.satisfied {
            format!("- ✅ {}", self.label)
        } else if self.failure_hint.is_empty() {
            format!("- ❌ {}", self.label)
        } else {
            format!("- ❌ {} — {}", self.label, self.failure_hint)
        }
    }
}

/// Marks earned by a single task along with the evidence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskResult {
    /// Task identifier.
    pub id:           String,
    /// Task name.
    pub name:         String,
    /// Marks awarded, always within `0..=max_marks`.
    pub earned:       u32,
    /// Marks available.
    pub max_marks:    u32,
    /// Per-requirement outcomes.
    pub requirements: Vec<Requirement>,
}

impl TaskResult {
    /// Number of satisfied requirements.
    pub fn satisfied(&self) -> usize {
        self.requirements.iter().filter(|r| r.satisfied).count()
    }

    /// Copy of this result with no marks, keeping the evidence.
    pub fn zeroed(mut self) -> Self {
        self.earned = 0;
        self
    }
}

/// Proportional share of `max_marks`, rounded to the nearest integer with
/// halves rounding up. No requirements means no marks.
pub fn proportional_marks(max_marks: u32, satisfied: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let satisfied = satisfied.min(total) as u64;
    let total = total as u64;
    let twice = 2 * u64::from(max_marks) * satisfied + total;
    (twice / (2 * total)) as u32
}

/// Grades a task against normalized submission text.
///
/// When the submission is not gradable the detectors are bypassed and a
/// single failed requirement is reported.
pub fn evaluate(task: &TaskSpec, code: &str, gradable: bool) -> TaskResult {
    let requirements: Vec<Requirement> = if gradable {
        task.checks.iter().map(|check| check.evaluate(code)).collect()
    } else {
        vec![Requirement::new(UNGRADABLE_LABEL, false, "")]
    };

    let satisfied = requirements.iter().filter(|r| r.satisfied).count();
    let earned = if gradable {
        proportional_marks(task.max_marks, satisfied, requirements.len())
    } else {
        0
    };

    tracing::debug!(
        task = task.id,
        satisfied,
        total = requirements.len(),
        earned,
        "task evaluated"
    );

    TaskResult {
        id: task.id.to_string(),
        name: task.name.to_string(),
        earned,
        max_marks: task.max_marks,
        requirements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(proportional_marks(5, 2, 3), 3);
        assert_eq!(proportional_marks(5, 1, 3), 2);
        assert_eq!(proportional_marks(5, 1, 4), 1);
        assert_eq!(proportional_marks(5, 3, 4), 4);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(proportional_marks(5, 1, 2), 3);
        assert_eq!(proportional_marks(5, 1, 10), 1);
    }

    #[test]
    fn bounds_hold() {
        for max in 0..=10 {
            for total in 0..=6 {
                for ok in 0..=total {
                    let marks = proportional_marks(max, ok, total);
                    assert!(marks <= max);
                    if ok == total && total > 0 {
                        assert_eq!(marks, max);
                    }
                    if ok == 0 {
                        assert_eq!(marks, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_task_scores_zero() {
        let task = TaskSpec {
            id:        "TODO 0",
            name:      "Nothing",
            max_marks: 5,
            checks:    &[],
        };
        let result = evaluate(&task, "anything at all", true);
        assert_eq!(result.earned, 0);
        assert!(result.requirements.is_empty());
    }

    #[test]
    fn ungradable_bypasses_detectors() {
        let task = TaskSpec {
            id:        "TODO 9",
            name:      "Logs",
            max_marks: 5,
            checks:    &[Check {
                label: "Logs",
                rule:  Rule::Pattern(r"console\.log"),
                hint:  "Log it.",
            }],
        };
        let result = evaluate(&task, "console.log(1)", false);
        assert_eq!(result.earned, 0);
        assert_eq!(result.requirements.len(), 1);
        assert_eq!(result.requirements[0].label, UNGRADABLE_LABEL);
        assert!(!result.requirements[0].satisfied);
    }

    #[test]
    fn markdown_includes_hint_only_on_failure() {
        assert_eq!(Requirement::new("A", true, "hint").to_markdown(), "- ✅ A");
        assert_eq!(Requirement::new("A", false, "hint").to_markdown(), "- ❌ A — hint");
        assert_eq!(Requirement::new("A", false, "").to_markdown(), "- ❌ A");
    }
}
