//! Access to the exam service.
//!
//! [`ExamApi`] is what the session controller talks to; [`HttpExamApi`] is the
//! HTTP implementation, created from an [`ApiClient`] once a token is known.

mod http;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ExamId, ExamSummary, ResultSummary};
use crate::protocol::{QuestionPayload, RunCodeRequest, RunCodeResponse, SubmitAnswerRequest};

pub use http::{ApiClient, HttpExamApi};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// Credentials of the logged-in user, handed to the API explicitly.
#[derive(Clone)]
pub struct AuthContext {
    token: String,
    role: Option<String>,
}

impl AuthContext {
    pub fn new(token: impl Into<String>, role: Option<String>) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Tokens given on the command line carry no role; those are trusted.
    pub fn is_student(&self) -> bool {
        self.role
            .as_deref()
            .is_none_or(|role| role.eq_ignore_ascii_case("student"))
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Student-side operations of the exam service.
#[async_trait]
pub trait ExamApi: Send + Sync {
    async fn list_exams(&self) -> Result<Vec<ExamSummary>, ApiError>;

    /// Questions of an attempt, with answers saved so far embedded.
    async fn load_questions(&self, exam_id: &ExamId) -> Result<Vec<QuestionPayload>, ApiError>;

    /// Upsert of one answer, keyed by attempt and question on the server.
    async fn save_answer(
        &self,
        exam_id: &ExamId,
        request: &SubmitAnswerRequest,
    ) -> Result<(), ApiError>;

    async fn run_code(
        &self,
        exam_id: &ExamId,
        request: &RunCodeRequest,
    ) -> Result<RunCodeResponse, ApiError>;

    /// Finalizes the attempt.
    async fn submit_exam(&self, exam_id: &ExamId) -> Result<(), ApiError>;

    /// Results of all submitted attempts, evaluated or not.
    async fn list_results(&self) -> Result<Vec<ResultSummary>, ApiError>;
}
