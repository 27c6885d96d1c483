use std::collections::HashMap;

use crate::model::{Question, QuestionId};

/// Aggregated completion state for one topic, useful for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopicProgress {
    pub done: usize,
    pub total: usize,
    pub percent: u32,
}

/// Compute `(done, total, percent)` for a topic's question list.
///
/// Recomputed on every query rather than cached: the completed map mutates
/// independently of the question list. `percent` is `round(done/total*100)`,
/// or 0 for an empty topic.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn topic_progress(
    questions: &[Question],
    completed: &HashMap<QuestionId, bool>,
) -> TopicProgress {
    let total = questions.len();
    let done = questions
        .iter()
        .filter(|question| completed.get(&question.id()).copied().unwrap_or(false))
        .count();
    let percent = if total == 0 {
        0
    } else {
        ((done as f64 / total as f64) * 100.0).round() as u32
    };
    TopicProgress {
        done,
        total,
        percent,
    }
}
