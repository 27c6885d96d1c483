use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::ids::QuestionId;
use super::question::Difficulty;

/// The four tracked question-bank domains.
///
/// Each domain namespaces its own persisted progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BankDomain {
    Dsa,
    Aptitude,
    Hr,
    CoreSubjects,
}

impl BankDomain {
    pub const ALL: [Self; 4] = [Self::Dsa, Self::Aptitude, Self::Hr, Self::CoreSubjects];

    /// Prefix for every persisted key belonging to this domain.
    #[must_use]
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            Self::Dsa => "prep:dsa:",
            Self::Aptitude => "prep:aptitude:",
            Self::Hr => "prep:hr:",
            Self::CoreSubjects => "prep:core-subjects:",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dsa => "dsa",
            Self::Aptitude => "aptitude",
            Self::Hr => "hr",
            Self::CoreSubjects => "core-subjects",
        }
    }
}

impl fmt::Display for BankDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bank domain: {raw}")]
pub struct ParseDomainError {
    pub raw: String,
}

impl FromStr for BankDomain {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dsa" => Ok(Self::Dsa),
            "aptitude" => Ok(Self::Aptitude),
            "hr" => Ok(Self::Hr),
            "core-subjects" => Ok(Self::CoreSubjects),
            other => Err(ParseDomainError {
                raw: other.to_string(),
            }),
        }
    }
}

/// One entry in a flat question bank (aptitude, HR, core subjects).
///
/// Unlike corpus questions these carry a model answer and no company scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankEntry {
    pub topic: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl BankEntry {
    /// Tracking id within the bank's scope, composed from topic and question.
    #[must_use]
    pub fn id(&self) -> QuestionId {
        QuestionId::from_parts(&[&self.topic, &self.question])
    }
}
