use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use super::{ApiError, AuthContext, ExamApi};
use crate::config::Settings;
use crate::models::{ExamId, ExamSummary, ResultSummary};
use crate::protocol::{
    LoginRequest, LoginResponse, QuestionPayload, RunCodeRequest, RunCodeResponse,
    SubmitAnswerRequest,
};

/// Unauthenticated handle on the service: base URL plus a configured
/// `reqwest` client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.api().request_timeout)
            .danger_accept_invalid_certs(settings.api().accept_invalid_certs)
            .build()?;

        Self::new(http, &settings.api().base_url)
    }

    pub fn new(http: Client, base_url: &str) -> Result<Self, ApiError> {
        // Url::join drops the last segment unless the base ends with '/'.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).map_err(|err| ApiError::Url(format!("{}: {}", base_url, err)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Url(format!("{}: {}", path, err)))
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint_segments(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthContext, ApiError> {
        let response = self
            .http
            .post(self.endpoint("auth/login")?)
            .json(credentials)
            .send()
            .await?;

        let body: LoginResponse = read_json(response).await?;
        tracing::info!(role = ?body.role, "Logged in");

        Ok(AuthContext::new(body.token, body.role))
    }

    pub fn authorize(self, auth: AuthContext) -> HttpExamApi {
        HttpExamApi { client: self, auth }
    }
}

/// [`ExamApi`] over HTTP. Every request carries the bearer token of the
/// context it was built with.
#[derive(Debug, Clone)]
pub struct HttpExamApi {
    client: ApiClient,
    auth: AuthContext,
}

impl HttpExamApi {
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    fn exam_endpoint(&self, exam_id: &ExamId, action: &str) -> Result<Url, ApiError> {
        let exam_id = exam_id.to_string();
        self.client
            .endpoint_segments(&["student", "exam", &exam_id, action])
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.client.http.get(url).bearer_auth(self.auth.token())
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.client.http.post(url).bearer_auth(self.auth.token())
    }
}

#[async_trait]
impl ExamApi for HttpExamApi {
    async fn list_exams(&self) -> Result<Vec<ExamSummary>, ApiError> {
        let response = self.get(self.client.endpoint("student/exams")?).send().await?;
        read_json(response).await
    }

    async fn load_questions(&self, exam_id: &ExamId) -> Result<Vec<QuestionPayload>, ApiError> {
        let response = self.get(self.exam_endpoint(exam_id, "questions")?).send().await?;
        read_json(response).await
    }

    async fn save_answer(
        &self,
        exam_id: &ExamId,
        request: &SubmitAnswerRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .post(self.exam_endpoint(exam_id, "submit-answer")?)
            .json(request)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn run_code(
        &self,
        exam_id: &ExamId,
        request: &RunCodeRequest,
    ) -> Result<RunCodeResponse, ApiError> {
        let response = self
            .post(self.exam_endpoint(exam_id, "run-code")?)
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn submit_exam(&self, exam_id: &ExamId) -> Result<(), ApiError> {
        let response = self
            .post(self.exam_endpoint(exam_id, "submit")?)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn list_results(&self) -> Result<Vec<ResultSummary>, ApiError> {
        let response = self
            .get(self.client.endpoint("results/my-results")?)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

async fn expect_success(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}
