#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::time::Instant;

use exam_client::api::{ApiError, ExamApi};
use exam_client::models::{ExamId, ExamSummary, ResultSummary};
use exam_client::protocol::{QuestionPayload, RunCodeRequest, RunCodeResponse, SubmitAnswerRequest};
use exam_client::session::{
    Clock, LoadError, NavigationLock, SessionController, SessionEvent, SessionServices,
};

/// Wall clock that follows tokio's (pausable) clock.
pub struct TokioClock {
    origin: OffsetDateTime,
    started: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: OffsetDateTime::now_utc().replace_nanosecond(0).unwrap(),
            started: Instant::now(),
        }
    }

    pub fn origin(&self) -> OffsetDateTime {
        self.origin
    }
}

impl Clock for TokioClock {
    fn now(&self) -> OffsetDateTime {
        self.origin + self.started.elapsed()
    }
}

/// In-memory exam service. Saved answers are written back into the question
/// list the same way the real service embeds them.
#[derive(Default)]
pub struct FakeApi {
    pub questions: Mutex<Vec<Value>>,
    pub saves: Mutex<Vec<SubmitAnswerRequest>>,
    pub runs: Mutex<Vec<RunCodeRequest>>,
    pub submits: Mutex<Vec<ExamId>>,
    pub run_output: Mutex<String>,
    pub fail_load: bool,
    pub fail_saves: bool,
    pub fail_runs: bool,
    pub fail_submit: bool,
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        body: "boom".to_string(),
    }
}

impl FakeApi {
    pub fn with_questions(questions: Vec<Value>) -> Self {
        Self {
            questions: Mutex::new(questions),
            run_output: Mutex::new("42\n".to_string()),
            ..Self::default()
        }
    }

    pub fn saves(&self) -> Vec<SubmitAnswerRequest> {
        self.saves.lock().unwrap().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.submits.lock().unwrap().len()
    }
}

#[async_trait]
impl ExamApi for FakeApi {
    async fn list_exams(&self) -> Result<Vec<ExamSummary>, ApiError> {
        Ok(Vec::new())
    }

    async fn load_questions(&self, _exam_id: &ExamId) -> Result<Vec<QuestionPayload>, ApiError> {
        if self.fail_load {
            return Err(server_error());
        }
        let questions = self.questions.lock().unwrap().clone();
        Ok(serde_json::from_value(Value::Array(questions))?)
    }

    async fn save_answer(
        &self,
        _exam_id: &ExamId,
        request: &SubmitAnswerRequest,
    ) -> Result<(), ApiError> {
        self.saves.lock().unwrap().push(request.clone());
        if self.fail_saves {
            return Err(server_error());
        }

        let id = serde_json::to_value(&request.question_id)?;
        let mut questions = self.questions.lock().unwrap();
        if let Some(question) = questions.iter_mut().find(|q| q["questionId"] == id) {
            let previous = question["studentAnswers"][0].clone();
            let merged = |field: &str, value: Option<Value>| {
                value.unwrap_or_else(|| previous.get(field).cloned().unwrap_or(Value::Null))
            };
            question["studentAnswers"] = json!([{
                "selectedOption": merged("selectedOption", request.selected_option.map(|o| json!(o))),
                "paragraphAnswer": merged("paragraphAnswer", request.paragraph_answer.clone().map(Value::from)),
                "code": merged("code", request.code.clone().map(Value::from)),
                "compilerOutput": merged("compilerOutput", request.compiler_output.clone().map(Value::from)),
            }]);
        }
        Ok(())
    }

    async fn run_code(
        &self,
        _exam_id: &ExamId,
        request: &RunCodeRequest,
    ) -> Result<RunCodeResponse, ApiError> {
        self.runs.lock().unwrap().push(request.clone());
        if self.fail_runs {
            return Err(server_error());
        }
        Ok(RunCodeResponse {
            output: self.run_output.lock().unwrap().clone(),
        })
    }

    async fn submit_exam(&self, exam_id: &ExamId) -> Result<(), ApiError> {
        self.submits.lock().unwrap().push(exam_id.clone());
        if self.fail_submit {
            return Err(server_error());
        }
        Ok(())
    }

    async fn list_results(&self) -> Result<Vec<ResultSummary>, ApiError> {
        Ok(Vec::new())
    }
}

/// Lets spawned autosave tasks run until `count` saves have arrived.
pub async fn wait_for_saves(api: &FakeApi, count: usize) {
    for _ in 0..100 {
        if api.saves.lock().unwrap().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
}

/// One question of each kind; `end_time` goes on the first.
pub fn mixed_questions(end_time: Option<OffsetDateTime>) -> Vec<Value> {
    let end_time = end_time.map(|t| {
        t.format(&time::format_description::well_known::Rfc3339)
            .unwrap()
    });

    vec![
        json!({
            "questionId": 1,
            "questionText": "Which keyword moves ownership into a closure?",
            "questionType": "MCQ",
            "optionA": "ref",
            "optionB": "move",
            "optionC": "mut",
            "optionD": "static",
            "endTime": end_time,
        }),
        json!({
            "questionId": 2,
            "questionText": "Explain borrowing.",
            "questionType": "PARAGRAPH",
            "endTime": end_time,
        }),
        json!({
            "questionId": 3,
            "questionText": "Print 42.",
            "questionType": "CODE",
            "codingLanguage": "Rust",
            "endTime": end_time,
        }),
    ]
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub clock: Arc<TokioClock>,
    pub lock: NavigationLock,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

pub async fn load(
    api: Arc<FakeApi>,
    clock: Arc<TokioClock>,
) -> (Result<SessionController, LoadError>, Harness) {
    let lock = NavigationLock::new();
    let (tx, events) = mpsc::unbounded_channel();
    let services = SessionServices {
        api: api.clone(),
        clock: clock.clone(),
        guard: Arc::new(lock.clone()),
    };

    let controller = SessionController::load(services, ExamId::Number(7), tx).await;
    (
        controller,
        Harness {
            api,
            clock,
            lock,
            events,
        },
    )
}

pub fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}
