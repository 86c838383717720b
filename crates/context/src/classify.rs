// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion context detection
//!
//! Decides what kind of word is being completed from the text before the
//! cursor. Rules, in priority order:
//!
//! 1. a word directly after `@` is a variable reference
//! 2. a word directly after `.` is a column of the qualifier before the dot
//! 3. anything else is a bare identifier
//!
//! Columns are character offsets, not bytes.

use serde::{Deserialize, Serialize};

/// Mode tag reported back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionMode {
    Variable,
    Column,
    Default,
}

/// Classified cursor context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// `@pre|`
    Variable { prefix: String, start: usize },

    /// `qualifier.pre|`
    ///
    /// `qualifier` is `None` when nothing identifier-like precedes the dot;
    /// such a context has no candidates.
    Column {
        qualifier: Option<String>,
        prefix: String,
        start: usize,
    },

    /// `pre|`
    Default { prefix: String, start: usize },
}

impl CompletionContext {
    pub fn mode(&self) -> CompletionMode {
        match self {
            CompletionContext::Variable { .. } => CompletionMode::Variable,
            CompletionContext::Column { .. } => CompletionMode::Column,
            CompletionContext::Default { .. } => CompletionMode::Default,
        }
    }

    /// Column where the word being completed starts
    pub fn start(&self) -> usize {
        match self {
            CompletionContext::Variable { start, .. }
            | CompletionContext::Column { start, .. }
            | CompletionContext::Default { start, .. } => *start,
        }
    }

    /// The partial word typed so far
    pub fn prefix(&self) -> &str {
        match self {
            CompletionContext::Variable { prefix, .. }
            | CompletionContext::Column { prefix, .. }
            | CompletionContext::Default { prefix, .. } => prefix,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start index of the word run ending at `end`
fn word_start(chars: &[char], end: usize) -> usize {
    let mut start = end;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    start
}

/// Classify the cursor context of `line` at character offset `column`.
///
/// `column` past the end of the line is clamped.
pub fn classify(line: &str, column: usize) -> CompletionContext {
    let chars: Vec<char> = line.chars().take(column).collect();
    let end = chars.len();
    let start = word_start(&chars, end);
    let prefix: String = chars[start..end].iter().collect();

    match start.checked_sub(1).map(|i| chars[i]) {
        Some('@') => CompletionContext::Variable { prefix, start },
        Some('.') => {
            let dot = start - 1;
            let qualifier_start = word_start(&chars, dot);
            let qualifier = (qualifier_start < dot)
                .then(|| chars[qualifier_start..dot].iter().collect::<String>());
            CompletionContext::Column {
                qualifier,
                prefix,
                start,
            }
        }
        _ => CompletionContext::Default { prefix, start },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_context() {
        assert_eq!(
            classify("WHERE id = @", 12),
            CompletionContext::Variable {
                prefix: String::new(),
                start: 12
            }
        );
        assert_eq!(
            classify("SET @cust", 9),
            CompletionContext::Variable {
                prefix: "cust".to_string(),
                start: 5
            }
        );
    }

    #[test]
    fn test_column_context() {
        let ctx = classify("c.", 2);
        assert_eq!(
            ctx,
            CompletionContext::Column {
                qualifier: Some("c".to_string()),
                prefix: String::new(),
                start: 2
            }
        );
        assert_eq!(ctx.mode(), CompletionMode::Column);

        let ctx = classify("SELECT orders.TOT FROM orders", 17);
        assert_eq!(ctx.prefix(), "TOT");
        assert_eq!(ctx.start(), 14);
    }

    #[test]
    fn test_dot_without_qualifier() {
        assert_eq!(
            classify("SELECT .", 8),
            CompletionContext::Column {
                qualifier: None,
                prefix: String::new(),
                start: 8
            }
        );
    }

    #[test]
    fn test_default_context() {
        assert_eq!(
            classify("SELECT * FROM ord", 17),
            CompletionContext::Default {
                prefix: "ord".to_string(),
                start: 14
            }
        );
        assert_eq!(classify("", 0).mode(), CompletionMode::Default);
    }

    #[test]
    fn test_cursor_in_middle_and_past_end() {
        // only text before the cursor counts
        assert_eq!(classify("c.id = @x", 4).mode(), CompletionMode::Column);
        assert_eq!(classify("ab", 99).start(), 0);
    }

    #[test]
    fn test_non_ascii_columns_are_chars() {
        let ctx = classify("é.na", 4);
        assert_eq!(ctx.start(), 2);
        assert!(matches!(ctx, CompletionContext::Column { qualifier: Some(ref q), .. } if q == "é"));
    }
}
