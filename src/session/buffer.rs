use std::collections::HashMap;

use crate::models::{Answer, AnswerPatch, QuestionId};

/// Latest answer per question.
///
/// Built once from the session's question list and never grows or shrinks,
/// so every question keeps exactly one entry for the whole attempt.
#[derive(Debug, Clone, Default)]
pub struct AnswerBuffer {
    answers: HashMap<QuestionId, Answer>,
}

impl AnswerBuffer {
    /// Builds the buffer from `(question id, saved answer)` pairs. A repeated
    /// id keeps its first answer.
    pub fn new(entries: impl IntoIterator<Item = (QuestionId, Answer)>) -> Self {
        let mut answers = HashMap::new();
        for (id, answer) in entries {
            answers.entry(id).or_insert(answer);
        }
        Self { answers }
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Answer> {
        self.answers.get(id)
    }

    /// Merges `patch` into the entry for `id`. Unknown ids are ignored.
    pub fn record(&mut self, id: &QuestionId, patch: &AnswerPatch) -> bool {
        match self.answers.get_mut(id) {
            Some(answer) => answer.apply(patch),
            None => {
                tracing::debug!(question_id = %id, "Ignoring answer for unknown question");
                false
            }
        }
    }

    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.answers.get(id).is_some_and(|answer| !answer.is_empty())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|answer| !answer.is_empty()).count()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
