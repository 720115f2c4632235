use thiserror::Error;
use time::OffsetDateTime;

use super::buffer::AnswerBuffer;
use crate::api::ApiError;
use crate::models::{Answer, ExamId, Question, QuestionId};
use crate::protocol::QuestionPayload;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not load exam {exam_id}: {source}")]
    Fetch {
        exam_id: ExamId,
        #[source]
        source: ApiError,
    },
    #[error("exam {0} has no questions")]
    NoQuestions(ExamId),
}

/// In-memory state of one attempt: the questions in order, the answer
/// buffer, the cursor and the shared deadline.
#[derive(Debug, Clone)]
pub struct Session {
    questions: Vec<Question>,
    answers: AnswerBuffer,
    cursor: usize,
    deadline: Option<OffsetDateTime>,
}

impl Session {
    /// Builds a session from the service's question list. The deadline is
    /// taken from the first question.
    pub fn from_payloads(
        exam_id: &ExamId,
        payloads: Vec<QuestionPayload>,
    ) -> Result<Self, LoadError> {
        if payloads.is_empty() {
            return Err(LoadError::NoQuestions(exam_id.clone()));
        }

        let (questions, saved): (Vec<Question>, Vec<Answer>) =
            payloads.into_iter().map(QuestionPayload::into_question).unzip();

        let deadline = questions.first().and_then(|question| question.ends_at);
        let answers = AnswerBuffer::new(
            questions
                .iter()
                .map(|question| question.id.clone())
                .zip(saved),
        );

        Ok(Self {
            questions,
            answers,
            cursor: 0,
            deadline,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.cursor]
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.questions.len()
    }

    pub fn deadline(&self) -> Option<OffsetDateTime> {
        self.deadline
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    pub fn answer(&self, id: &QuestionId) -> Option<&Answer> {
        self.answers.get(id)
    }

    pub fn answers(&self) -> &AnswerBuffer {
        &self.answers
    }

    pub(crate) fn answers_mut(&mut self) -> &mut AnswerBuffer {
        &mut self.answers
    }

    /// Moves the cursor. Out-of-range indices leave it where it is.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        self.cursor = index;
        true
    }

    pub fn next(&mut self) -> bool {
        self.select(self.cursor + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.cursor.checked_sub(1) {
            Some(index) => self.select(index),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads() -> Vec<QuestionPayload> {
        serde_json::from_str(
            r#"[
                { "questionId": 1, "questionText": "One", "questionType": "MCQ",
                  "endTime": "2026-06-01T10:00:00Z" },
                { "questionId": 2, "questionText": "Two", "questionType": "PARAGRAPH",
                  "studentAnswers": [{ "paragraphAnswer": "draft" }] },
                { "questionId": 3, "questionText": "Three", "questionType": "CODE" }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_one_buffer_entry_per_question() {
        let session = Session::from_payloads(&ExamId::Number(7), payloads()).unwrap();

        assert_eq!(session.len(), 3);
        assert_eq!(session.answers().len(), 3);
        for question in session.questions() {
            assert!(session.answer(&question.id).is_some());
        }
        assert_eq!(session.answer(&QuestionId::Number(2)).unwrap().text, "draft");
        assert!(session.deadline().is_some());
    }

    #[test]
    fn test_cursor_stays_in_range() {
        let mut session = Session::from_payloads(&ExamId::Number(7), payloads()).unwrap();

        assert!(!session.previous());
        assert_eq!(session.cursor(), 0);

        assert!(session.select(2));
        assert!(session.is_last());
        assert!(!session.next());
        assert!(!session.select(3));
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn test_empty_question_list_is_a_load_error() {
        let err = Session::from_payloads(&ExamId::Number(7), Vec::new()).unwrap_err();
        assert!(matches!(err, LoadError::NoQuestions(_)));
    }
}
