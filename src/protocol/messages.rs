//! Request and response bodies of the exam service.
//!
//! All bodies are JSON. Field names follow the service (camelCase, except the
//! run-code request which the service reads as PascalCase).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::timestamp;
use crate::models::{Answer, OptionLabel, Question, QuestionId, QuestionKind};

/// Language assumed for code questions that do not name one.
pub const DEFAULT_CODING_LANGUAGE: &str = "cpp";

/// `POST auth/login` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// One entry of `GET student/exam/{id}/questions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub question_id: QuestionId,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub question_type: String,
    #[serde(default)]
    pub option_a: Option<String>,
    #[serde(default)]
    pub option_b: Option<String>,
    #[serde(default)]
    pub option_c: Option<String>,
    #[serde(default)]
    pub option_d: Option<String>,
    #[serde(default)]
    pub coding_language: Option<String>,
    #[serde(default, alias = "EndTime", deserialize_with = "timestamp::deserialize_option")]
    pub end_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub student_answers: Option<Vec<StoredAnswer>>,
}

/// An answer previously autosaved for this attempt.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnswer {
    #[serde(default)]
    pub selected_option: Option<String>,
    #[serde(default)]
    pub paragraph_answer: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub compiler_output: Option<String>,
}

impl QuestionPayload {
    pub fn kind(&self) -> QuestionKind {
        match self.question_type.trim().to_ascii_uppercase().as_str() {
            "MCQ" => QuestionKind::SingleChoice {
                options: [
                    self.option_a.clone().unwrap_or_default(),
                    self.option_b.clone().unwrap_or_default(),
                    self.option_c.clone().unwrap_or_default(),
                    self.option_d.clone().unwrap_or_default(),
                ],
            },
            "CODE" | "CODING" => QuestionKind::Code {
                language: self
                    .coding_language
                    .as_deref()
                    .map(str::trim)
                    .filter(|language| !language.is_empty())
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| DEFAULT_CODING_LANGUAGE.to_string()),
            },
            "PARAGRAPH" => QuestionKind::FreeText,
            other => {
                tracing::warn!(
                    question_id = %self.question_id,
                    question_type = other,
                    "Unknown question type, treating as free text"
                );
                QuestionKind::FreeText
            }
        }
    }

    /// Splits the payload into the question and the answer saved so far.
    pub fn into_question(self) -> (Question, Answer) {
        let kind = self.kind();
        let stored = self
            .student_answers
            .and_then(|answers| answers.into_iter().next())
            .unwrap_or_default();

        let answer = Answer {
            selected: stored.selected_option.as_deref().and_then(OptionLabel::parse),
            text: stored.paragraph_answer.unwrap_or_default(),
            code: stored.code.unwrap_or_default(),
            output: stored.compiler_output.unwrap_or_default(),
        };

        let question = Question {
            id: self.question_id,
            prompt: self.question_text,
            kind,
            ends_at: self.end_time,
        };

        (question, answer)
    }
}

/// `POST student/exam/{id}/submit-answer` body. Only the fields that belong to
/// the question's kind are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub question_id: QuestionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<OptionLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_output: Option<String>,
}

impl SubmitAnswerRequest {
    pub fn for_question(question: &Question, answer: &Answer) -> Self {
        let mut request = Self {
            question_id: question.id.clone(),
            selected_option: None,
            paragraph_answer: None,
            code: None,
            compiler_output: None,
        };

        match question.kind {
            QuestionKind::SingleChoice { .. } => request.selected_option = answer.selected,
            QuestionKind::FreeText => request.paragraph_answer = Some(answer.text.clone()),
            QuestionKind::Code { .. } => {
                request.code = Some(answer.code.clone());
                request.compiler_output = Some(answer.output.clone());
            }
        }

        request
    }
}

/// `POST student/exam/{id}/run-code` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCodeRequest {
    #[serde(rename = "QuestionId")]
    pub question_id: QuestionId,
    #[serde(rename = "Code")]
    pub code: String,
}

/// `POST student/exam/{id}/run-code` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCodeResponse {
    #[serde(default)]
    pub output: String,
}
