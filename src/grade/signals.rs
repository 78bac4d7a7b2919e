#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Textual signals detected in normalized submissions.
//!
//! Every signal is data: a named [`Rule`] tree whose leaves are
//! case-insensitive regular expressions. Adding a rubric variant means adding
//! or recombining constants here, never touching the evaluation code.

use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, PoisonError},
};

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

lazy_static! {
    /// Compiled patterns, keyed by their source text.
    static ref COMPILED: Mutex<HashMap<&'static str, Option<Regex>>> = Mutex::new(HashMap::new());
}

/// Returns whether `pattern` matches anywhere in `code`, ignoring case.
///
/// A pattern that fails to compile never matches.
fn pattern_matches(pattern: &'static str, code: &str) -> bool {
    let mut cache = COMPILED.lock().unwrap_or_else(PoisonError::into_inner);
    let compiled = cache.entry(pattern).or_insert_with(|| {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Signal pattern `{pattern}` does not compile: {e}");
                None
            }
        }
    });

    compiled.as_ref().is_some_and(|re| re.is_match(code))
}

/// A boolean test over normalized source text.
#[derive(Clone, Copy, Debug)]
pub enum Rule {
    /// Matches when the case-insensitive regex is found.
    Pattern(&'static str),
    /// Matches when at least one inner rule matches.
    Any(&'static [Rule]),
    /// Matches when every inner rule matches.
    All(&'static [Rule]),
}

impl Rule {
    /// Evaluates the rule against normalized text.
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Rule::Pattern(p) => pattern_matches(*p, code),
            Rule::Any(rules) => rules.iter().any(|r| r.matches(code)),
            Rule::All(rules) => rules.iter().all(|r| r.matches(code)),
        }
    }

    /// Every regex leaf of this rule, in declaration order.
    pub fn patterns(&self) -> Vec<&'static str> {
        match self {
            Rule::Pattern(p) => vec![*p],
            Rule::Any(rules) | Rule::All(rules) => rules.iter().flat_map(Rule::patterns).collect(),
        }
    }
}

/// Writes `op(a, b, ...)` for a composite rule.
fn write_composite(f: &mut fmt::Formatter<'_>, op: &str, rules: &[Rule]) -> fmt::Result {
    write!(f, "{op}(")?;
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{rule}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Pattern(p) => write!(f, "/{p}/i"),
            Rule::Any(rules) => write_composite(f, "any", rules),
            Rule::All(rules) => write_composite(f, "all", rules),
        }
    }
}

/// A named, reusable rule.
#[derive(Clone, Copy, Debug)]
pub struct Signal {
    /// Stable identifier shown in listings and debug logs.
    pub name: &'static str,
    /// What has to be present for the signal to fire.
    pub rule: Rule,
}

impl Signal {
    /// Whether the signal fires on `code`.
    pub fn detect(&self, code: &str) -> bool {
        let hit = self.rule.matches(code);
        tracing::debug!(signal = self.name, hit, "signal evaluated");
        hit
    }
}

/// `import mongoose ...` or `require("mongoose")`.
pub const IMPORTS_MONGOOSE: Signal = Signal {
    name: "imports_mongoose",
    rule: Rule::Any(&[
        Rule::Pattern(r"\bimport\s+mongoose\b"),
        Rule::Pattern(r#"\brequire\s*\(\s*["']mongoose["']\s*\)"#),
    ]),
};

/// `mongoose.connect(` or a bare `connect("mongodb+srv://`.
pub const CALLS_CONNECT: Signal = Signal {
    name: "calls_connect",
    rule: Rule::Any(&[
        Rule::Pattern(r"\bmongoose\.connect\s*\("),
        Rule::Pattern(r#"\bconnect\s*\(\s*["']mongodb\+srv://"#),
    ]),
};

/// A cloud-style `mongodb+srv://` string, or one read from `process.env`.
pub const CLOUD_CONNECTION_STRING: Signal = Signal {
    name: "cloud_connection_string",
    rule: Rule::Any(&[Rule::Pattern(r"mongodb\+srv://"), Rule::Pattern(r"process\.env\.")]),
};

/// `new mongoose.Schema(` or `mongoose.Schema(`.
pub const CREATES_SCHEMA: Signal = Signal {
    name: "creates_schema",
    rule: Rule::Any(&[
        Rule::Pattern(r"new\s+mongoose\.schema\s*\("),
        Rule::Pattern(r"mongoose\.schema\s*\("),
    ]),
};

/// A `studentSchema` identifier.
pub const NAMES_STUDENT_SCHEMA: Signal = Signal {
    name: "names_student_schema",
    rule: Rule::Pattern(r"\bstudentSchema\b"),
};

/// `name: String`, `age: Number` and `major: String`, all three.
pub const DECLARES_STUDENT_FIELDS: Signal = Signal {
    name: "declares_student_fields",
    rule: Rule::All(&[
        Rule::Pattern(r"\bname\s*:\s*String\b"),
        Rule::Pattern(r"\bage\s*:\s*Number\b"),
        Rule::Pattern(r"\bmajor\s*:\s*String\b"),
    ]),
};

/// `mongoose.model("Student"`, or any `mongoose.model(` plus a `student` word.
pub const CREATES_STUDENT_MODEL: Signal = Signal {
    name: "creates_student_model",
    rule: Rule::Any(&[
        Rule::Pattern(r#"\bmongoose\.model\s*\(\s*["']student["']"#),
        Rule::All(&[Rule::Pattern(r"\bmongoose\.model\s*\("), Rule::Pattern(r"\bstudent\b")]),
    ]),
};

/// `async function` or any `await`.
pub const USES_ASYNC: Signal = Signal {
    name: "uses_async",
    rule: Rule::Any(&[Rule::Pattern(r"\basync\s+function\b"), Rule::Pattern(r"\bawait\b")]),
};

/// `Student.insertMany(` or any `.insertMany(`.
pub const INSERTS_MANY: Signal = Signal {
    name: "inserts_many",
    rule: Rule::Any(&[
        Rule::Pattern(r"\bstudent\.insertMany\s*\("),
        Rule::Pattern(r"\.insertMany\s*\("),
    ]),
};

/// An array literal holding at least two `{ name: ... }` objects.
pub const INSERTS_DOCUMENT_ARRAY: Signal = Signal {
    name: "inserts_document_array",
    rule: Rule::All(&[
        Rule::Pattern(r"\[\s*\{\s*name\s*:"),
        Rule::Pattern(r"\}\s*,\s*\{\s*name\s*:"),
    ]),
};

/// `new Student(` together with a `.save(` call.
pub const SAVES_NEW_DOCUMENT: Signal = Signal {
    name: "saves_new_document",
    rule: Rule::All(&[Rule::Pattern(r"\bnew\s+Student\s*\("), Rule::Pattern(r"\.save\s*\(")]),
};

/// `Student.find(` or any `.find(`.
pub const FINDS_DOCUMENTS: Signal = Signal {
    name: "finds_documents",
    rule: Rule::Any(&[Rule::Pattern(r"\bStudent\.find\s*\("), Rule::Pattern(r"\.find\s*\(")]),
};

/// `console.log(`.
pub const LOGS_OUTPUT: Signal = Signal {
    name: "logs_output",
    rule: Rule::Pattern(r"\bconsole\.log\s*\("),
};

/// `Student.updateOne(`, `Student.updateMany(` or `Student.findOneAndUpdate(`.
pub const UPDATES_DOCUMENT: Signal = Signal {
    name: "updates_document",
    rule: Rule::Any(&[
        Rule::Pattern(r"\bStudent\.updateOne\s*\("),
        Rule::Pattern(r"\bStudent\.updateMany\s*\("),
        Rule::Pattern(r"\bStudent\.findOneAndUpdate\s*\("),
    ]),
};

/// A `{ name: "Ali" }` filter.
pub const FILTERS_BY_ALI: Signal = Signal {
    name: "filters_by_ali",
    rule: Rule::Pattern(r#"\{\s*name\s*:\s*["']ali["']\s*\}"#),
};

/// `age: 22`, directly or inside `$set`.
pub const SETS_AGE: Signal = Signal {
    name: "sets_age",
    rule: Rule::Any(&[
        Rule::Pattern(r"\bage\s*:\s*22\b"),
        Rule::Pattern(r"\$set\s*:\s*\{\s*age\s*:\s*22"),
    ]),
};

/// `Student.deleteOne(`, `Student.deleteMany(` or `Student.findOneAndDelete(`.
pub const DELETES_DOCUMENT: Signal = Signal {
    name: "deletes_document",
    rule: Rule::Any(&[
        Rule::Pattern(r"\bStudent\.deleteOne\s*\("),
        Rule::Pattern(r"\bStudent\.deleteMany\s*\("),
        Rule::Pattern(r"\bStudent\.findOneAndDelete\s*\("),
    ]),
};

/// A `{ name: "Sara" }` filter.
pub const FILTERS_BY_SARA: Signal = Signal {
    name: "filters_by_sara",
    rule: Rule::Pattern(r#"\{\s*name\s*:\s*["']sara["']\s*\}"#),
};

/// Every signal the lab rubric draws from.
pub const ALL_SIGNALS: &[Signal] = &[
    IMPORTS_MONGOOSE,
    CALLS_CONNECT,
    CLOUD_CONNECTION_STRING,
    CREATES_SCHEMA,
    NAMES_STUDENT_SCHEMA,
    DECLARES_STUDENT_FIELDS,
    CREATES_STUDENT_MODEL,
    USES_ASYNC,
    INSERTS_MANY,
    INSERTS_DOCUMENT_ARRAY,
    SAVES_NEW_DOCUMENT,
    FINDS_DOCUMENTS,
    LOGS_OUTPUT,
    UPDATES_DOCUMENT,
    FILTERS_BY_ALI,
    SETS_AGE,
    DELETES_DOCUMENT,
    FILTERS_BY_SARA,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        for signal in ALL_SIGNALS {
            for pattern in signal.rule.patterns() {
                assert!(
                    RegexBuilder::new(pattern).case_insensitive(true).build().is_ok(),
                    "{} has a bad pattern: {pattern}",
                    signal.name
                );
            }
        }
    }

    #[test]
    fn signal_names_are_unique() {
        let mut names: Vec<_> = ALL_SIGNALS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_SIGNALS.len());
    }

    #[test]
    fn matching_ignores_case() {
        assert!(IMPORTS_MONGOOSE.detect(r#"const m = REQUIRE("Mongoose");"#));
        assert!(FILTERS_BY_ALI.detect(r#"Student.updateOne({ name: "ALI" }, { age: 22 })"#));
    }

    #[test]
    fn all_rule_needs_every_part() {
        assert!(!DECLARES_STUDENT_FIELDS.detect("{ name: String, age: Number }"));
        assert!(DECLARES_STUDENT_FIELDS.detect("{ name: String, age: Number, major: String }"));
    }

    #[test]
    fn save_is_an_alternative_to_insert_many() {
        let code = "const s = new Student({ name: 'Ali' }); await s.save();";
        assert!(!INSERTS_MANY.detect(code));
        assert!(SAVES_NEW_DOCUMENT.detect(code));
    }

    #[test]
    fn model_accepts_loose_spelling() {
        assert!(CREATES_STUDENT_MODEL.detect("const S = mongoose.model('Student', s);"));
        assert!(CREATES_STUDENT_MODEL.detect("const Student = mongoose.model(modelName, s);"));
        assert!(!CREATES_STUDENT_MODEL.detect("const M = mongoose.model('Course', s);"));
    }

    #[test]
    fn display_lists_alternatives() {
        assert_eq!(
            CLOUD_CONNECTION_STRING.rule.to_string(),
            r"any(/mongodb\+srv:///i, /process\.env\./i)"
        );
    }
}
