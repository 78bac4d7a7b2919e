#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::EMPTY_CODE_THRESHOLD;

lazy_static! {
    /// `/* ... */`, non-greedy, may span lines.
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment regex");
    /// `//` to end of line, only when it starts a line or follows whitespace.
    /// A byte order mark counts as whitespace.
    static ref LINE_COMMENT: Regex =
        Regex::new(r"(?m)(^|[\s\x{FEFF}])//.*$").expect("valid line comment regex");
    /// Any run of whitespace, byte order marks included.
    static ref WHITESPACE: Regex = Regex::new(r"[\s\x{FEFF}]+").expect("valid whitespace regex");
}

/// Removes block and line comments from JavaScript source.
///
/// A `//` glued to a preceding token (as in `mongodb+srv://`) is kept, so
/// connection strings survive. The whitespace before a removed line comment
/// is preserved.
pub fn strip_comments(code: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(code, "");
    LINE_COMMENT.replace_all(&without_blocks, "$1").into_owned()
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn compact_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim_matches(' ').to_string()
}

/// Produces the canonical comment-free, single-spaced text that signals are
/// matched against.
pub fn normalize(raw: &str) -> String {
    compact_whitespace(&strip_comments(raw))
}

/// Whether normalized text is too short to be a real attempt.
///
/// Length is measured in UTF-16 code units, so a character outside the
/// basic multilingual plane (most emoji) counts twice.
pub fn is_empty_code(normalized: &str) -> bool {
    normalized.encode_utf16().count() < EMPTY_CODE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_block_comments_across_lines() {
        let code = "const a = 1;\n/* mongoose.connect(\n 'x') */\nconst b = 2;";
        assert_eq!(normalize(code), "const a = 1; const b = 2;");
    }

    #[test]
    fn block_comments_are_non_greedy() {
        let code = "/* one */ keep(); /* two */";
        assert_eq!(normalize(code), "keep();");
    }

    #[test]
    fn strips_line_comments_but_keeps_urls() {
        let code = "mongoose.connect(\"mongodb+srv://user@cluster0/db\"); // connect here\n// \
                    Student.find()\nconsole.log(1);";
        assert_eq!(
            normalize(code),
            "mongoose.connect(\"mongodb+srv://user@cluster0/db\"); console.log(1);"
        );
    }

    #[test]
    fn comment_only_file_is_empty() {
        let code = "// TODO 1: connect\n/*\n * TODO 2: schema\n */\n   \n";
        let normalized = normalize(code);
        assert_eq!(normalized, "");
        assert!(is_empty_code(&normalized));
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(is_empty_code("123456789"));
        assert!(!is_empty_code("1234567890"));
    }

    #[test]
    fn byte_order_mark_does_not_hide_a_comment() {
        let code = "\u{feff}// TODO 1: Establish Connection with MongoDB via Mongoose\n// TODO 2\n";
        let normalized = normalize(code);
        assert_eq!(normalized, "");
        assert!(is_empty_code(&normalized));
    }

    #[test]
    fn byte_order_mark_is_trimmed_before_code() {
        let code = "\u{feff}const mongoose = require('mongoose'); // import\n";
        assert_eq!(normalize(code), "const mongoose = require('mongoose');");
    }

    #[test]
    fn length_counts_utf16_units() {
        // four emoji are eight UTF-16 units; five are ten
        assert!(is_empty_code("😀😀😀😀"));
        assert!(!is_empty_code("😀😀😀😀😀"));
    }
}
