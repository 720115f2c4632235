use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use exam_client::api::{ApiClient, ApiError, AuthContext, ExamApi, HttpExamApi};
use exam_client::models::{ExamId, OptionLabel, QuestionId, QuestionKind};
use exam_client::protocol::{LoginRequest, RunCodeRequest, SubmitAnswerRequest};

const TOKEN: &str = "secret-token";

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorded {
    fn push(&self, path: String, body: Value) {
        self.requests.lock().unwrap().push((path, body));
    }

    fn all(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {}", TOKEN).as_str())
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "hunter2" {
        (
            StatusCode::OK,
            Json(json!({ "token": TOKEN, "role": "Student" })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
    }
}

async fn exams(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!([{
            "examId": 7,
            "examName": "Systems Programming",
            "subjectName": "CS",
            "startTime": "2026-01-01T09:00:00",
            "endTime": "2026-01-01T11:00:00",
            "duration": 120,
            "totalMarks": 50.0,
            "isCompleted": false
        }])),
    )
}

async fn questions(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if id != "7" {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Exam not found" })));
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "questionId": 11,
                "questionText": "Pick one",
                "questionType": "MCQ",
                "optionA": "a", "optionB": "b", "optionC": "c", "optionD": "d",
                "correctOption": "A",
                "endTime": "2026-01-01T11:00:00",
                "studentAnswers": [{ "selectedOption": "B" }]
            },
            {
                "questionId": 12,
                "questionText": "Write it",
                "questionType": "CODE",
                "codingLanguage": "Python",
                "endTime": "2026-01-01T11:00:00"
            }
        ])),
    )
}

async fn submit_answer(
    State(recorded): State<Recorded>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    recorded.push(format!("/student/exam/{}/submit-answer", id), body);
    StatusCode::OK
}

async fn run_code(
    State(recorded): State<Recorded>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.push(format!("/student/exam/{}/run-code", id), body);
    Json(json!({ "output": "hello\n" }))
}

async fn submit(
    State(recorded): State<Recorded>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    recorded.push(format!("/student/exam/{}/submit", id), body);
    if id == "7" {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn my_results(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "studentExamId": 31,
                "examName": "Systems Programming",
                "status": "Evaluated",
                "obtainedMarks": 40.0,
                "totalMarks": 50.0
            },
            {
                "studentExamId": 32,
                "examName": "Networks",
                "status": "Submitted",
                "obtainedMarks": 0,
                "totalMarks": 30
            }
        ])),
    )
}

async fn spawn_stub() -> (ApiClient, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/student/exams", get(exams))
        .route("/api/student/exam/:id/questions", get(questions))
        .route("/api/student/exam/:id/submit-answer", post(submit_answer))
        .route("/api/student/exam/:id/run-code", post(run_code))
        .route("/api/student/exam/:id/submit", post(submit))
        .route("/api/results/my-results", get(my_results))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(reqwest::Client::new(), &format!("http://{}/api", addr)).unwrap();
    (client, recorded)
}

async fn student_api() -> (HttpExamApi, Recorded) {
    let (client, recorded) = spawn_stub().await;
    (client.authorize(AuthContext::new(TOKEN, None)), recorded)
}

#[tokio::test]
async fn test_login() {
    let (client, _) = spawn_stub().await;

    let auth = client
        .login(&LoginRequest {
            email: "student@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(auth.token(), TOKEN);
    assert!(auth.is_student());

    let err = client
        .login(&LoginRequest {
            email: "student@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_list_exams_and_questions() {
    let (api, _) = student_api().await;

    let exams = api.list_exams().await.unwrap();
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0].exam_id, ExamId::Number(7));
    assert_eq!(exams[0].exam_name, "Systems Programming");

    let payloads = api.load_questions(&ExamId::Number(7)).await.unwrap();
    let (question, answer) = payloads[0].clone().into_question();
    assert_eq!(question.id, QuestionId::Number(11));
    assert_eq!(answer.selected, Some(OptionLabel::B));
    assert!(question.ends_at.is_some());

    let (code, _) = payloads[1].clone().into_question();
    assert_eq!(
        code.kind,
        QuestionKind::Code {
            language: "python".to_string()
        }
    );
}

#[tokio::test]
async fn test_list_results() {
    let (api, _) = student_api().await;

    let results = api.list_results().await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].reference(), "REF-ID 000031");
    assert_eq!(results[0].percentage(), Some(80.0));
    assert_eq!(results[1].exam_name, "Networks");
    assert_eq!(results[1].score(), None);

    let (client, _) = spawn_stub().await;
    let stale = client.authorize(AuthContext::new("stale", None));
    assert!(stale.list_results().await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_text_exam_id_stays_in_its_segment() {
    let (api, _) = student_api().await;

    // Reaches the questions handler with the decoded id instead of a
    // router-level 404.
    let err = api
        .load_questions(&ExamId::Text("x/y?z".to_string()))
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Exam not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (client, _) = spawn_stub().await;
    let api = client.authorize(AuthContext::new("stale", None));

    let err = api.list_exams().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (api, _) = student_api().await;

    let err = api.load_questions(&ExamId::Number(8)).await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Exam not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(api.submit_exam(&ExamId::Number(8)).await.is_err());
}

#[tokio::test]
async fn test_request_bodies() {
    let (api, recorded) = student_api().await;
    let exam = ExamId::Number(7);

    api.save_answer(
        &exam,
        &SubmitAnswerRequest {
            question_id: QuestionId::Number(11),
            selected_option: Some(OptionLabel::C),
            paragraph_answer: None,
            code: None,
            compiler_output: None,
        },
    )
    .await
    .unwrap();

    let response = api
        .run_code(
            &exam,
            &RunCodeRequest {
                question_id: QuestionId::Number(12),
                code: "print('hello')".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(response.output, "hello\n");

    api.submit_exam(&exam).await.unwrap();

    let requests = recorded.all();
    assert_eq!(
        requests,
        vec![
            (
                "/student/exam/7/submit-answer".to_string(),
                json!({ "questionId": 11, "selectedOption": "C" })
            ),
            (
                "/student/exam/7/run-code".to_string(),
                json!({ "QuestionId": 12, "Code": "print('hello')" })
            ),
            ("/student/exam/7/submit".to_string(), json!({})),
        ]
    );
}
