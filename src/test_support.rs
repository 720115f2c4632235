use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::api::{ApiError, ExamApi};
use crate::models::{ExamId, ExamSummary, ResultSummary};
use crate::protocol::{QuestionPayload, RunCodeRequest, RunCodeResponse, SubmitAnswerRequest};

/// Exam service double: one question of each kind, fixed run output, and a
/// log of every save and submit.
pub(crate) struct RecordingApi {
    questions: Vec<Value>,
    results: Vec<Value>,
    pub(crate) saves: Mutex<Vec<SubmitAnswerRequest>>,
    pub(crate) submits: Mutex<Vec<ExamId>>,
}

impl RecordingApi {
    pub(crate) fn new(deadline: Option<OffsetDateTime>) -> Self {
        let end_time = deadline.and_then(|t| t.format(&Rfc3339).ok());

        Self {
            questions: vec![
                json!({
                    "questionId": 1, "questionText": "Pick one", "questionType": "MCQ",
                    "optionA": "a", "optionB": "b", "optionC": "c", "optionD": "d",
                    "endTime": end_time,
                }),
                json!({
                    "questionId": 2, "questionText": "Explain", "questionType": "PARAGRAPH",
                    "endTime": end_time,
                }),
                json!({
                    "questionId": 3, "questionText": "Print 42", "questionType": "CODE",
                    "endTime": end_time,
                }),
            ],
            results: vec![json!({
                "studentExamId": 12, "examName": "Networks", "status": "Evaluated",
                "obtainedMarks": 18, "totalMarks": 24,
            })],
            saves: Mutex::new(Vec::new()),
            submits: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn saves(&self) -> Vec<SubmitAnswerRequest> {
        self.saves.lock().unwrap().clone()
    }

    pub(crate) fn submit_count(&self) -> usize {
        self.submits.lock().unwrap().len()
    }

    /// Lets spawned autosave tasks run until `count` saves have arrived.
    pub(crate) async fn wait_for_saves(&self, count: usize) {
        for _ in 0..100 {
            if self.saves.lock().unwrap().len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ExamApi for RecordingApi {
    async fn list_exams(&self) -> Result<Vec<ExamSummary>, ApiError> {
        Ok(Vec::new())
    }

    async fn load_questions(&self, _exam_id: &ExamId) -> Result<Vec<QuestionPayload>, ApiError> {
        Ok(serde_json::from_value(Value::Array(self.questions.clone()))?)
    }

    async fn save_answer(
        &self,
        _exam_id: &ExamId,
        request: &SubmitAnswerRequest,
    ) -> Result<(), ApiError> {
        self.saves.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn run_code(
        &self,
        _exam_id: &ExamId,
        _request: &RunCodeRequest,
    ) -> Result<RunCodeResponse, ApiError> {
        Ok(RunCodeResponse {
            output: "42\n".to_string(),
        })
    }

    async fn submit_exam(&self, exam_id: &ExamId) -> Result<(), ApiError> {
        self.submits.lock().unwrap().push(exam_id.clone());
        Ok(())
    }

    async fn list_results(&self) -> Result<Vec<ResultSummary>, ApiError> {
        Ok(serde_json::from_value(Value::Array(self.results.clone()))?)
    }
}
