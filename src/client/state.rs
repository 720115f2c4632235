//! Client state management.

use time::OffsetDateTime;

use crate::models::{AnswerPatch, ExamId, ExamSummary, QuestionId, QuestionKind, ResultSummary};
use crate::session::{NavigationLock, SessionController};

const EMAIL_MAX_LENGTH: usize = 128;
const PASSWORD_MAX_LENGTH: usize = 128;

/// Current screen of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    /// Entering credentials.
    Login,
    /// Choosing an exam.
    ExamList,
    /// Past attempts and their marks.
    Results,
    /// Fetching questions for an exam.
    LoadingExam { exam_id: ExamId },
    /// Taking an exam.
    Exam,
    /// Final submission in flight.
    Submitting { message: String },
    /// Blocking message; any key returns to the exam list.
    Notice { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub field: LoginField,
    pub error: Option<String>,
    pub pending: bool,
}

impl LoginForm {
    pub fn push(&mut self, c: char) {
        let (value, max) = match self.field {
            LoginField::Email => (&mut self.email, EMAIL_MAX_LENGTH),
            LoginField::Password => (&mut self.password, PASSWORD_MAX_LENGTH),
        };
        if value.chars().count() < max {
            value.push(c);
        }
        self.error = None;
    }

    pub fn pop(&mut self) {
        match self.field {
            LoginField::Email => self.email.pop(),
            LoginField::Password => self.password.pop(),
        };
        self.error = None;
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExamListView {
    pub exams: Vec<ExamSummary>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl ExamListView {
    pub fn set_exams(&mut self, exams: Vec<ExamSummary>) {
        self.exams = exams;
        self.selected = self.selected.min(self.exams.len().saturating_sub(1));
        self.loading = false;
        self.error = None;
    }

    pub fn select_next(&mut self) {
        if !self.exams.is_empty() {
            self.selected = (self.selected + 1) % self.exams.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.exams.is_empty() {
            self.selected = (self.selected + self.exams.len() - 1) % self.exams.len();
        }
    }

    pub fn selected_exam(&self) -> Option<&ExamSummary> {
        self.exams.get(self.selected)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    pub results: Vec<ResultSummary>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl ResultsView {
    pub fn set_results(&mut self, results: Vec<ResultSummary>) {
        self.results = results;
        self.selected = self.selected.min(self.results.len().saturating_sub(1));
        self.loading = false;
        self.error = None;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Evaluated attempts only.
    pub fn average_percentage(&self) -> Option<f64> {
        let scores: Vec<f64> = self.results.iter().filter_map(ResultSummary::percentage).collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// An exam in progress, plus what the exam screen needs around it.
pub struct ExamView {
    pub controller: SessionController,
    /// The answer field of the current question has focus.
    pub editing: bool,
    /// Question whose code is being executed.
    pub running: Option<QuestionId>,
    /// Inline error from the last failed run, per question.
    pub run_error: Option<(QuestionId, String)>,
    /// Waiting for `y`/`n` after asking to submit.
    pub confirm_submit: bool,
    /// Guard warnings and similar one-line messages.
    pub status: Option<String>,
}

impl ExamView {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller,
            editing: false,
            running: None,
            run_error: None,
            confirm_submit: false,
            status: None,
        }
    }

    pub fn current_id(&self) -> QuestionId {
        self.controller.current_question().id.clone()
    }

    pub fn current_is_editable(&self) -> bool {
        matches!(
            self.controller.current_question().kind,
            QuestionKind::FreeText | QuestionKind::Code { .. }
        )
    }

    /// Appends `c` to the text or code of the current question.
    pub fn type_char(&mut self, c: char) {
        self.edit(|value| value.push(c));
    }

    pub fn backspace(&mut self) {
        self.edit(|value| {
            value.pop();
        });
    }

    fn edit(&mut self, change: impl FnOnce(&mut String)) {
        let question = self.controller.current_question();
        let id = question.id.clone();
        let is_code = question.is_code();
        let Some(answer) = self.controller.session().answer(&id) else {
            return;
        };

        let mut value = if is_code {
            answer.code.clone()
        } else {
            answer.text.clone()
        };
        change(&mut value);

        let patch = if is_code {
            AnswerPatch::code(value)
        } else {
            AnswerPatch::text(value)
        };
        self.controller.record_answer(&id, &patch);
    }

    /// Leaves the answer field; this is the commit trigger for text and code.
    pub fn blur(&mut self) {
        if self.editing {
            self.editing = false;
            let id = self.current_id();
            self.controller.commit_answer(&id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

/// Client application state.
pub struct ClientApp {
    /// Current screen.
    pub state: ClientState,
    pub login: LoginForm,
    pub exams: ExamListView,
    pub results: ResultsView,
    pub exam: Option<ExamView>,
    pub lock: NavigationLock,
    /// Service base URL, shown in headers.
    pub server: String,
    /// Refreshed before each frame; drives exam list countdowns.
    pub now: OffsetDateTime,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl ClientApp {
    pub fn new(server: String, lock: NavigationLock, email: Option<String>) -> Self {
        Self {
            state: ClientState::Login,
            login: LoginForm {
                email: email.unwrap_or_default(),
                ..LoginForm::default()
            },
            exams: ExamListView::default(),
            results: ResultsView::default(),
            exam: None,
            lock,
            server,
            now: OffsetDateTime::now_utc(),
            should_quit: false,
        }
    }

    pub fn enter_exam_list(&mut self) {
        self.state = ClientState::ExamList;
        self.exams.loading = true;
    }

    pub fn enter_results(&mut self) {
        self.state = ClientState::Results;
        self.results.loading = true;
    }

    pub fn enter_loading(&mut self, exam_id: ExamId) {
        self.state = ClientState::LoadingExam { exam_id };
    }

    pub fn enter_exam(&mut self, controller: SessionController) {
        self.exam = Some(ExamView::new(controller));
        self.state = ClientState::Exam;
    }

    pub fn enter_submitting(&mut self, message: impl Into<String>) {
        self.state = ClientState::Submitting {
            message: message.into(),
        };
    }

    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.state = ClientState::Notice {
            message: message.into(),
        };
    }
}
