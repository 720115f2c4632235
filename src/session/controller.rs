use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::autosave::AutosaveDispatcher;
use super::clock::{Clock, Countdown};
use super::guard::{GuardHandle, SessionGuard};
use super::state::{LoadError, Session};
use super::SessionEvent;
use crate::api::{ApiError, ExamApi};
use crate::models::{AnswerPatch, ExamId, OptionLabel, Question, QuestionId};
use crate::protocol::{RunCodeRequest, SubmitAnswerRequest};

pub const TIMEOUT_NOTICE: &str = "Time expired! Submitting automatically...";
pub const SUBMITTED_NOTICE: &str = "Exam submitted successfully!";
pub const UNCONFIRMED_NOTICE: &str = "Your exam was closed, but the server did not confirm the submission.";

#[derive(Debug, Error)]
pub enum RunError {
    #[error("execution failed: {0}")]
    Api(#[from] ApiError),
    #[error("question {0} is not a code question")]
    NotCode(QuestionId),
    #[error("session already submitted")]
    Submitted,
}

impl RunError {
    /// Text for the output panel.
    pub fn user_message(&self) -> String {
        match self {
            RunError::Api(_) => {
                "Execution error: make sure the code execution service is running.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
#[error("final submission of exam {exam_id} failed: {source}")]
pub struct SubmitError {
    pub exam_id: ExamId,
    #[source]
    pub source: ApiError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    Manual,
    Timeout,
}

/// Result of the final submission. The session is over either way; callers
/// show `notice` (if any) and leave for the exam list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub reason: SubmitReason,
    pub acknowledged: bool,
    pub notice: Option<&'static str>,
}

/// Collaborators a session needs besides the exam id.
#[derive(Clone)]
pub struct SessionServices {
    pub api: Arc<dyn ExamApi>,
    pub clock: Arc<dyn Clock>,
    pub guard: Arc<dyn SessionGuard>,
}

/// A code run prepared from the buffered source. Runs without borrowing the
/// controller so the UI can keep going while it is in flight.
pub struct PendingRun {
    api: Arc<dyn ExamApi>,
    exam_id: ExamId,
    request: RunCodeRequest,
}

impl PendingRun {
    pub fn question_id(&self) -> &QuestionId {
        &self.request.question_id
    }

    pub async fn execute(self) -> Result<String, RunError> {
        let response = self.api.run_code(&self.exam_id, &self.request).await?;
        Ok(response.output)
    }
}

/// Owns one attempt from load to submission.
pub struct SessionController {
    exam_id: ExamId,
    session: Session,
    api: Arc<dyn ExamApi>,
    autosave: AutosaveDispatcher,
    countdown: Option<Countdown>,
    guard: Option<GuardHandle>,
    submitted: bool,
}

impl SessionController {
    /// Fetches the questions and saved answers of `exam_id`, installs the
    /// navigation guard and starts the countdown.
    ///
    /// Clock ticks and the expiry signal are sent on `events`; feed them back
    /// through [`SessionController::handle_event`].
    pub async fn load(
        services: SessionServices,
        exam_id: ExamId,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<Self, LoadError> {
        let payloads = services
            .api
            .load_questions(&exam_id)
            .await
            .map_err(|source| LoadError::Fetch {
                exam_id: exam_id.clone(),
                source,
            })?;

        let session = Session::from_payloads(&exam_id, payloads)?;

        tracing::info!(
            exam_id = %exam_id,
            questions = session.len(),
            answered = session.answers().answered_count(),
            timed = session.deadline().is_some(),
            "Exam session loaded"
        );

        let guard = GuardHandle::install(services.guard);
        let countdown = session
            .deadline()
            .map(|deadline| Countdown::start(deadline, services.clock, events));

        Ok(Self {
            autosave: AutosaveDispatcher::new(Arc::clone(&services.api), exam_id.clone()),
            exam_id,
            session,
            api: services.api,
            countdown,
            guard: Some(guard),
            submitted: false,
        })
    }

    pub fn exam_id(&self) -> &ExamId {
        &self.exam_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_question(&self) -> &Question {
        self.session.current()
    }

    /// Seconds left, or `None` for an untimed session.
    pub fn remaining(&self) -> Option<u64> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    pub fn is_ticking(&self) -> bool {
        self.countdown.as_ref().is_some_and(Countdown::is_running)
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn autosaves_dispatched(&self) -> u64 {
        self.autosave.dispatched()
    }

    pub fn select_question(&mut self, index: usize) -> bool {
        self.session.select(index)
    }

    pub fn next_question(&mut self) -> bool {
        self.session.next()
    }

    pub fn previous_question(&mut self) -> bool {
        self.session.previous()
    }

    /// Local merge into the answer buffer; nothing is sent.
    pub fn record_answer(&mut self, id: &QuestionId, patch: &AnswerPatch) -> bool {
        self.session.answers_mut().record(id, patch)
    }

    /// Sends the buffered answer for `id`. Returns `None` when there is
    /// nothing to send (unknown question, or the attempt is already over).
    pub fn commit_answer(&self, id: &QuestionId) -> Option<JoinHandle<()>> {
        if self.submitted {
            tracing::debug!(question_id = %id, "Skipping commit after submission");
            return None;
        }

        let question = self.session.question(id)?;
        let answer = self.session.answer(id)?;
        let request = SubmitAnswerRequest::for_question(question, answer);

        Some(self.autosave.dispatch(request))
    }

    /// Choosing an option commits immediately.
    pub fn choose_option(&mut self, id: &QuestionId, label: OptionLabel) -> Option<JoinHandle<()>> {
        self.record_answer(id, &AnswerPatch::select(label));
        self.commit_answer(id)
    }

    pub fn prepare_run(&self, id: &QuestionId) -> Result<PendingRun, RunError> {
        if self.submitted {
            return Err(RunError::Submitted);
        }

        let question = self
            .session
            .question(id)
            .filter(|question| question.is_code())
            .ok_or_else(|| RunError::NotCode(id.clone()))?;
        let code = self
            .session
            .answer(&question.id)
            .map(|answer| answer.code.clone())
            .unwrap_or_default();

        Ok(PendingRun {
            api: Arc::clone(&self.api),
            exam_id: self.exam_id.clone(),
            request: RunCodeRequest {
                question_id: question.id.clone(),
                code,
            },
        })
    }

    /// Applies a finished run: on success the output is buffered and the code
    /// question is committed together with it.
    pub fn finish_run(
        &mut self,
        id: &QuestionId,
        result: Result<String, RunError>,
    ) -> Result<(), RunError> {
        match result {
            Ok(output) => {
                self.record_answer(id, &AnswerPatch::output(output));
                self.commit_answer(id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(exam_id = %self.exam_id, question_id = %id, error = %err, "Code run failed");
                Err(err)
            }
        }
    }

    pub async fn run_code(&mut self, id: &QuestionId) -> Result<(), RunError> {
        let pending = self.prepare_run(id)?;
        let result = pending.execute().await;
        self.finish_run(id, result)
    }

    /// Ends the attempt: stops the clock, lifts the guard and asks the service
    /// to finalize. Returns `None` if the attempt was already submitted.
    pub async fn submit(&mut self, reason: SubmitReason) -> Option<SubmitOutcome> {
        if self.submitted {
            return None;
        }
        self.submitted = true;

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.stop();
        }
        self.guard = None;

        tracing::info!(exam_id = %self.exam_id, reason = ?reason, "Submitting exam");

        let result = self
            .api
            .submit_exam(&self.exam_id)
            .await
            .map_err(|source| SubmitError {
                exam_id: self.exam_id.clone(),
                source,
            });

        let acknowledged = match result {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "Exam submission failed");
                false
            }
        };

        let notice = match (reason, acknowledged) {
            (SubmitReason::Timeout, _) => Some(TIMEOUT_NOTICE),
            (SubmitReason::Manual, true) => Some(SUBMITTED_NOTICE),
            (SubmitReason::Manual, false) => Some(UNCONFIRMED_NOTICE),
        };

        Some(SubmitOutcome {
            reason,
            acknowledged,
            notice,
        })
    }

    pub async fn handle_event(&mut self, event: SessionEvent) -> Option<SubmitOutcome> {
        match event {
            SessionEvent::Tick { .. } => None,
            SessionEvent::Expired => self.submit(SubmitReason::Timeout).await,
        }
    }
}
