use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::{BankEntry, Question, QuestionId};

/// Tab filter applied after the free-text search, identically in every
/// question-bank view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTab {
    #[default]
    All,
    Bookmarked,
    Complete,
    Incomplete,
}

impl FilterTab {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Bookmarked => "bookmarked",
            Self::Complete => "complete",
            Self::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for FilterTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter tab: {raw}")]
pub struct ParseTabError {
    pub raw: String,
}

impl FromStr for FilterTab {
    type Err = ParseTabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "bookmarked" => Ok(Self::Bookmarked),
            "complete" => Ok(Self::Complete),
            "incomplete" => Ok(Self::Incomplete),
            other => Err(ParseTabError {
                raw: other.to_string(),
            }),
        }
    }
}

/// An item that can be searched and tracked by id.
///
/// The searchable text differs per bank: corpus questions expose title,
/// topic, and company; flat bank entries expose question and answer.
pub trait Trackable {
    fn tracking_id(&self) -> QuestionId;
    fn searchable_text(&self) -> String;
}

impl Trackable for Question {
    fn tracking_id(&self) -> QuestionId {
        self.id()
    }

    fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.topic, self.company)
    }
}

impl Trackable for BankEntry {
    fn tracking_id(&self) -> QuestionId {
        self.id()
    }

    fn searchable_text(&self) -> String {
        format!("{} {}", self.question, self.answer)
    }
}

/// Apply the shared search + tab filter to a question list.
///
/// Case-insensitive substring match of `search` against the item's searchable
/// text (empty search matches everything), AND-ed with the tab predicate.
/// Result order is the original list order.
#[must_use]
pub fn apply_filters<'a, T: Trackable>(
    items: &'a [T],
    search: &str,
    tab: FilterTab,
    completed: &HashMap<QuestionId, bool>,
    bookmarked: &HashMap<QuestionId, bool>,
) -> Vec<&'a T> {
    let needle = search.trim().to_lowercase();
    items
        .iter()
        .filter(|item| {
            (needle.is_empty() || item.searchable_text().to_lowercase().contains(&needle))
                && matches_tab(tab, &item.tracking_id(), completed, bookmarked)
        })
        .collect()
}

fn matches_tab(
    tab: FilterTab,
    id: &QuestionId,
    completed: &HashMap<QuestionId, bool>,
    bookmarked: &HashMap<QuestionId, bool>,
) -> bool {
    let is_set = |map: &HashMap<QuestionId, bool>| map.get(id).copied().unwrap_or(false);
    match tab {
        FilterTab::All => true,
        FilterTab::Bookmarked => is_set(bookmarked),
        FilterTab::Complete => is_set(completed),
        FilterTab::Incomplete => !is_set(completed),
    }
}
