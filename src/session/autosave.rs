use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::api::{ApiError, ExamApi};
use crate::models::ExamId;
use crate::protocol::SubmitAnswerRequest;

#[derive(Debug, Error)]
#[error("autosave of question {question_id} failed: {source}")]
pub struct AutosaveError {
    pub question_id: String,
    #[source]
    pub source: ApiError,
}

/// Pushes single answers to the service, one request per commit.
///
/// Requests are neither coalesced nor ordered; the service upserts by
/// question, so the last write to arrive wins. Failures are logged and
/// dropped.
#[derive(Clone)]
pub struct AutosaveDispatcher {
    api: Arc<dyn ExamApi>,
    exam_id: ExamId,
    sequence: Arc<AtomicU64>,
}

impl AutosaveDispatcher {
    pub fn new(api: Arc<dyn ExamApi>, exam_id: ExamId) -> Self {
        Self {
            api,
            exam_id,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sends `request` in the background. The handle may be ignored; it exists
    /// so callers can wait for delivery.
    pub fn dispatch(&self, request: SubmitAnswerRequest) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let exam_id = self.exam_id.clone();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;

        tokio::spawn(async move {
            match save(api.as_ref(), &exam_id, &request).await {
                Ok(()) => {
                    tracing::debug!(
                        exam_id = %exam_id,
                        question_id = %request.question_id,
                        seq,
                        "Answer autosaved"
                    );
                }
                Err(err) => {
                    tracing::warn!(exam_id = %exam_id, seq, error = %err, "Autosave failed");
                }
            }
        })
    }

    /// Number of commits dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

async fn save(
    api: &dyn ExamApi,
    exam_id: &ExamId,
    request: &SubmitAnswerRequest,
) -> Result<(), AutosaveError> {
    api.save_answer(exam_id, request)
        .await
        .map_err(|source| AutosaveError {
            question_id: request.question_id.to_string(),
            source,
        })
}
