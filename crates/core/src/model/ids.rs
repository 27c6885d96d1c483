use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when composing a `QuestionId` from its parts.
///
/// Chosen because it does not occur in company names, topic names, or
/// question titles produced by the corpus parser.
pub const ID_SEPARATOR: char = '|';

/// Derived identity of a tracked question.
///
/// Composed from `(company, topic, title)` and never stored on the question
/// itself; it is the sole key into the progress maps. Two distinct questions
/// must never compose to the same id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Compose an id from a question's owning company, topic, and title.
    #[must_use]
    pub fn compose(company: &str, topic: &str, title: &str) -> Self {
        Self(format!(
            "{company}{ID_SEPARATOR}{topic}{ID_SEPARATOR}{title}"
        ))
    }

    /// Compose an id from an arbitrary sequence of parts.
    ///
    /// Used by the flat question banks, whose entries have no company scope.
    #[must_use]
    pub fn from_parts(parts: &[&str]) -> Self {
        Self(parts.join(&ID_SEPARATOR.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for QuestionId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
