use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::QuestionId;

/// Difficulty of a question as tagged in the source corpus.
///
/// Unrecognized or missing tags default to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty tag case-insensitively.
    ///
    /// Returns `None` for anything other than `easy`, `medium`, or `hard`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single question extracted from the corpus.
///
/// Belongs to exactly one `(company, topic)` pair at creation time and is
/// never reparented. The back-references are carried so the derived
/// [`QuestionId`] can be computed without walking the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub url: String,
    pub topic: String,
    pub company: String,
}

impl Question {
    /// Derived identity used as the key into all progress maps.
    #[must_use]
    pub fn id(&self) -> QuestionId {
        QuestionId::compose(&self.company, &self.topic, &self.title)
    }
}
