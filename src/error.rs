//! Error types.
//!
//! Two families of failures exist:
//!
//! - [`LexiconError`]: the lexicon is malformed. These are fatal at load time;
//!   no partially built lexicon or feature graph is ever returned.
//! - [`SessionError`]: a sentence cannot be started, or the caller drives the
//!   session out of order (stepping past the end, ranking before the end).
//!
//! Finding no complete parse is *not* an error: ranking simply returns an
//! empty list.
//!
//! [`Error`] wraps both for the one-shot `parse` helpers.

use thiserror::Error;

/// A malformed lexicon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexiconError {
    #[error("line {line}: expected `word :: feature groups`")]
    MalformedLine { line: usize },

    #[error("line {line}: missing word before `::`")]
    EmptyWord { line: usize },

    #[error("entry `{word}` has an empty feature group")]
    EmptyGroup { word: String },

    #[error("entry `{word}`: invalid feature token `{token}`")]
    InvalidFeature { word: String, token: String },

    #[error("entry `{word}`: feature `{feature}` appears twice in one word part")]
    DuplicateFeature { word: String, feature: String },

    #[error("word `{0}` is defined more than once")]
    DuplicateWord(String),
}

/// A sentence could not be started, or the session was driven out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("sentence has no tokens")]
    EmptySentence,

    #[error("word `{0}` is not in the lexicon")]
    UnknownWord(String),

    #[error("all word parts have already been consumed")]
    Exhausted,

    #[error("sentence is not complete yet ({consumed}/{total} word parts consumed)")]
    Incomplete { consumed: usize, total: usize },
}

/// Any failure of the one-shot parse helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("lexicon: {0}")]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_item() {
        let err = LexiconError::DuplicateFeature { word: "admires".into(), feature: "=N:acc".into() };
        assert_eq!(err.to_string(), "entry `admires`: feature `=N:acc` appears twice in one word part");

        let err = SessionError::Incomplete { consumed: 2, total: 4 };
        assert_eq!(err.to_string(), "sentence is not complete yet (2/4 word parts consumed)");

        let err: Error = LexiconError::MalformedLine { line: 3 }.into();
        assert_eq!(err.to_string(), "lexicon: line 3: expected `word :: feature groups`");
    }
}
