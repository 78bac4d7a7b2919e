#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Rubric for Lab 7-1 (MongoDB + Mongoose), Part B.
//!
//! Signals are deliberately loose: students are not required to reproduce
//! the handout code, only the recognizable idioms.

use super::{
    rubric::{Check, TaskSpec},
    signals::{
        CALLS_CONNECT, CLOUD_CONNECTION_STRING, CREATES_SCHEMA, CREATES_STUDENT_MODEL,
        DECLARES_STUDENT_FIELDS, DELETES_DOCUMENT, FILTERS_BY_ALI, FILTERS_BY_SARA,
        FINDS_DOCUMENTS, IMPORTS_MONGOOSE, INSERTS_DOCUMENT_ARRAY, INSERTS_MANY, LOGS_OUTPUT,
        NAMES_STUDENT_SCHEMA, Rule, SAVES_NEW_DOCUMENT, SETS_AGE, UPDATES_DOCUMENT, USES_ASYNC,
    },
};

/// Marks per Mongoose TODO.
const TODO_MARKS: u32 = 5;

/// TODO 1: connection.
const CONNECT: TaskSpec = TaskSpec {
    id:        "TODO 1",
    name:      "Establish Connection with MongoDB via Mongoose",
    max_marks: TODO_MARKS,
    checks:    &[
        Check {
            label: "Imports mongoose",
            rule:  IMPORTS_MONGOOSE.rule,
            hint:  "Import/require mongoose.",
        },
        Check {
            label: "Calls mongoose.connect(...)",
            rule:  CALLS_CONNECT.rule,
            hint:  "Call mongoose.connect(connectionString).",
        },
        Check {
            label: "Uses mongodb+srv connection string (or env-based)",
            rule:  CLOUD_CONNECTION_STRING.rule,
            hint:  "Use mongodb+srv://... or process.env.",
        },
    ],
};

/// TODO 2: schema and model.
const SCHEMA: TaskSpec = TaskSpec {
    id:        "TODO 2",
    name:      "Define the schema of the DB (Student schema + model)",
    max_marks: TODO_MARKS,
    checks:    &[
        Check {
            label: "Creates a mongoose.Schema",
            rule:  CREATES_SCHEMA.rule,
            hint:  "Use new mongoose.Schema({ ... }).",
        },
        Check {
            label: "Mentions studentSchema (or equivalent variable)",
            rule:  Rule::Any(&[NAMES_STUDENT_SCHEMA.rule, CREATES_SCHEMA.rule]),
            hint:  "Store schema in a variable (studentSchema).",
        },
        Check {
            label: "Schema includes name, age, major fields",
            rule:  DECLARES_STUDENT_FIELDS.rule,
            hint:  "Include name:String, age:Number, major:String.",
        },
        Check {
            label: "Creates Student model using mongoose.model()",
            rule:  CREATES_STUDENT_MODEL.rule,
            hint:  "Use mongoose.model(\"Student\", studentSchema).",
        },
    ],
};

/// TODO 3: create documents.
const CREATE: TaskSpec = TaskSpec {
    id:        "TODO 3",
    name:      "Create Document (insertMany or equivalent)",
    max_marks: TODO_MARKS,
    checks:    &[
        Check {
            label: "Uses async/await (signal)",
            rule:  USES_ASYNC.rule,
            hint:  "Use async/await for DB calls.",
        },
        Check {
            label: "Creates documents using insertMany(...) OR save()",
            rule:  Rule::Any(&[INSERTS_MANY.rule, SAVES_NEW_DOCUMENT.rule]),
            hint:  "Use Student.insertMany(...) or new Student(...).save().",
        },
        Check {
            label: "Includes multiple documents (array with at least 2 objects) (signal)",
            rule:  Rule::Any(&[INSERTS_DOCUMENT_ARRAY.rule, SAVES_NEW_DOCUMENT.rule]),
            hint:  "Insert at least 2 students.",
        },
    ],
};

/// TODO 4: read documents.
const READ: TaskSpec = TaskSpec {
    id:        "TODO 4",
    name:      "Read Documents (Student.find)",
    max_marks: TODO_MARKS,
    checks:    &[
        Check {
            label: "Uses Student.find(...) (or equivalent)",
            rule:  FINDS_DOCUMENTS.rule,
            hint:  "Use Student.find() to read documents.",
        },
        Check {
            label: "Outputs results (console.log)",
            rule:  LOGS_OUTPUT.rule,
            hint:  "Log the results.",
        },
    ],
};

/// TODO 5: update a document.
const UPDATE: TaskSpec = TaskSpec {
    id:        "TODO 5",
    name:      "Update Document (updateOne or equivalent)",
    max_marks: TODO_MARKS,
    checks:    &[
        Check {
            label: "Uses an update method (updateOne/updateMany/findOneAndUpdate)",
            rule:  UPDATES_DOCUMENT.rule,
            hint:  "Use updateOne(...) or similar.",
        },
        Check {
            label: "Targets Ali by name (signal)",
            rule:  FILTERS_BY_ALI.rule,
            hint:  "Filter like { name: \"Ali\" }.",
        },
        Check {
            label: "Updates age field (signal)",
            rule:  SETS_AGE.rule,
            hint:  "Update age to 22 (or update age).",
        },
    ],
};

/// TODO 6: delete a document.
const DELETE: TaskSpec = TaskSpec {
    id:        "TODO 6",
    name:      "Delete Document (deleteOne or equivalent)",
    max_marks: TODO_MARKS,
    checks:    &[
        Check {
            label: "Uses a delete method (deleteOne/deleteMany/findOneAndDelete)",
            rule:  DELETES_DOCUMENT.rule,
            hint:  "Use deleteOne(...) or similar.",
        },
        Check {
            label: "Targets Sara by name (signal)",
            rule:  FILTERS_BY_SARA.rule,
            hint:  "Filter like { name: \"Sara\" }.",
        },
    ],
};

/// The six Mongoose TODOs, in the order they appear in the handout.
pub const MONGOOSE_TASKS: &[TaskSpec] = &[CONNECT, SCHEMA, CREATE, READ, UPDATE, DELETE];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MONGOOSE_MAX;

    #[test]
    fn task_marks_add_up_to_part_b() {
        let sum: u32 = MONGOOSE_TASKS.iter().map(|t| t.max_marks).sum();
        assert_eq!(sum, MONGOOSE_MAX);
    }

    #[test]
    fn every_task_has_requirements() {
        assert!(MONGOOSE_TASKS.iter().all(|t| !t.checks.is_empty()));
    }
}
