//! Terminal client: event loop and input handling.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use time::OffsetDateTime;
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, AuthContext, ExamApi};
use crate::config::Settings;
use crate::models::{ExamId, ExamSummary, OptionLabel, QuestionId, QuestionKind, ResultSummary};
use crate::protocol::LoginRequest;
use crate::session::{
    Intent, LoadError, NavigationLock, RunError, SessionController, SessionEvent, SessionServices,
    SubmitOutcome, SubmitReason, SystemClock, Verdict, TIMEOUT_NOTICE,
};
use crate::terminal;

use super::state::{ClientApp, ClientState};
use super::ui;

/// Results of background work, delivered back to the event loop.
enum AppMessage {
    LoggedIn(Result<AuthContext, ApiError>),
    ExamsLoaded(Result<Vec<ExamSummary>, ApiError>),
    ResultsLoaded(Result<Vec<ResultSummary>, ApiError>),
    SessionLoaded(Result<SessionController, LoadError>),
    RunFinished {
        question_id: QuestionId,
        result: Result<String, RunError>,
    },
    Submitted(Option<SubmitOutcome>),
}

/// Everything the loop needs besides the screen state.
struct Runtime {
    client: ApiClient,
    api: Option<Arc<dyn ExamApi>>,
    tx: mpsc::UnboundedSender<AppMessage>,
    session_events: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    /// Exam to open as soon as we are authorized.
    pending_exam: Option<ExamId>,
}

/// Run the exam client until the user quits.
pub async fn run(settings: Settings, exam: Option<ExamId>) -> anyhow::Result<()> {
    let client = ApiClient::from_settings(&settings)?;
    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

    let mut app = ClientApp::new(
        client.base_url().to_string(),
        NavigationLock::new(),
        settings.auth().email.clone(),
    );
    let mut runtime = Runtime {
        client,
        api: None,
        tx,
        session_events: None,
        pending_exam: exam,
    };

    if let Some(token) = settings.auth().token.clone() {
        runtime.authorize(&mut app, AuthContext::new(token, None));
    }

    let mut terminal = terminal::init()?;
    let mut input = EventStream::new();
    let mut redraw = tokio::time::interval(Duration::from_secs(1));

    let result = loop {
        app.now = OffsetDateTime::now_utc();
        terminal.draw(|frame| ui::render(frame, &app))?;

        if app.should_quit {
            break Ok(());
        }

        tokio::select! {
            event = input.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    runtime.handle_key(&mut app, key);
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => break Err(err.into()),
                None => break Ok(()),
            },
            Some(message) = rx.recv() => runtime.apply(&mut app, message),
            Some(event) = next_session_event(&mut runtime.session_events) => {
                runtime.on_session_event(&mut app, event);
            }
            _ = redraw.tick() => {}
        }
    };

    terminal::restore()?;
    tracing::info!("Client exited");

    result
}

async fn next_session_event(
    events: &mut Option<mpsc::UnboundedReceiver<SessionEvent>>,
) -> Option<SessionEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

impl Runtime {
    fn authorize(&mut self, app: &mut ClientApp, auth: AuthContext) {
        self.api = Some(Arc::new(self.client.clone().authorize(auth)));

        match self.pending_exam.take() {
            Some(exam_id) => self.open_exam(app, exam_id),
            None => self.refresh_exams(app),
        }
    }

    fn refresh_exams(&mut self, app: &mut ClientApp) {
        let Some(api) = self.api.clone() else {
            app.state = ClientState::Login;
            return;
        };

        app.enter_exam_list();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppMessage::ExamsLoaded(api.list_exams().await));
        });
    }

    fn refresh_results(&mut self, app: &mut ClientApp) {
        let Some(api) = self.api.clone() else {
            app.state = ClientState::Login;
            return;
        };

        app.enter_results();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppMessage::ResultsLoaded(api.list_results().await));
        });
    }

    /// The token was rejected; back to the login screen.
    fn expire_login(&mut self, app: &mut ClientApp) {
        self.api = None;
        app.state = ClientState::Login;
        app.login.error = Some("Session expired, please log in again.".to_string());
    }

    fn open_exam(&mut self, app: &mut ClientApp, exam_id: ExamId) {
        let Some(api) = self.api.clone() else {
            return;
        };

        tracing::info!(exam_id = %exam_id, "Opening exam");
        app.enter_loading(exam_id.clone());

        // A fresh channel per session so ticks of a finished attempt can
        // never reach the next one.
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.session_events = Some(events_rx);

        let services = SessionServices {
            api,
            clock: Arc::new(SystemClock),
            guard: Arc::new(app.lock.clone()),
        };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let loaded = SessionController::load(services, exam_id, events_tx).await;
            let _ = tx.send(AppMessage::SessionLoaded(loaded));
        });
    }

    fn login(&mut self, app: &mut ClientApp) {
        if app.login.pending || !app.login.is_complete() {
            return;
        }

        app.login.pending = true;
        let request = LoginRequest {
            email: app.login.email.trim().to_string(),
            password: app.login.password.clone(),
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppMessage::LoggedIn(client.login(&request).await));
        });
    }

    fn submit(&mut self, app: &mut ClientApp, reason: SubmitReason) {
        let Some(mut view) = app.exam.take() else {
            return;
        };

        self.session_events = None;
        app.enter_submitting(match reason {
            SubmitReason::Timeout => TIMEOUT_NOTICE,
            SubmitReason::Manual => "Submitting exam...",
        });

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = view.controller.submit(reason).await;
            let _ = tx.send(AppMessage::Submitted(outcome));
        });
    }

    fn apply(&mut self, app: &mut ClientApp, message: AppMessage) {
        match message {
            AppMessage::LoggedIn(Ok(auth)) => {
                app.login.pending = false;
                if !auth.is_student() {
                    app.login.error = Some("This client is for student accounts only.".to_string());
                    return;
                }
                app.login.password.clear();
                self.authorize(app, auth);
            }
            AppMessage::LoggedIn(Err(err)) => {
                tracing::warn!(error = %err, "Login failed");
                app.login.pending = false;
                app.login.error = Some(match err {
                    ApiError::Status { .. } => {
                        "The email or password you entered is incorrect.".to_string()
                    }
                    _ => "Network error. Check the server connection.".to_string(),
                });
            }
            AppMessage::ExamsLoaded(Ok(exams)) => app.exams.set_exams(exams),
            AppMessage::ExamsLoaded(Err(err)) => {
                tracing::warn!(error = %err, "Failed to fetch exams");
                app.exams.loading = false;
                if err.is_unauthorized() {
                    self.expire_login(app);
                } else {
                    app.exams.error = Some(err.to_string());
                }
            }
            AppMessage::ResultsLoaded(Ok(results)) => app.results.set_results(results),
            AppMessage::ResultsLoaded(Err(err)) => {
                tracing::warn!(error = %err, "Failed to fetch results");
                app.results.loading = false;
                if err.is_unauthorized() {
                    self.expire_login(app);
                } else {
                    app.results.error = Some(err.to_string());
                }
            }
            AppMessage::SessionLoaded(Ok(controller)) => {
                let expired = controller.remaining() == Some(0);
                app.enter_exam(controller);
                // The one expiry event may have been handled while nothing was
                // on screen to submit.
                if expired {
                    self.submit(app, SubmitReason::Timeout);
                }
            }
            AppMessage::SessionLoaded(Err(err)) => {
                tracing::warn!(error = %err, "Failed to load exam session");
                self.session_events = None;
                app.show_notice(err.to_string());
            }
            AppMessage::RunFinished {
                question_id,
                result,
            } => {
                let Some(view) = app.exam.as_mut() else {
                    return;
                };
                view.running = None;
                match view.controller.finish_run(&question_id, result) {
                    Ok(()) => view.run_error = None,
                    Err(err) => view.run_error = Some((question_id, err.user_message())),
                }
            }
            AppMessage::Submitted(outcome) => {
                let message = outcome
                    .and_then(|outcome| outcome.notice)
                    .unwrap_or("Exam closed.");
                app.show_notice(message);
            }
        }
    }

    fn on_session_event(&mut self, app: &mut ClientApp, event: SessionEvent) {
        match event {
            SessionEvent::Tick { .. } => {}
            SessionEvent::Expired => {
                if let Some(view) = app.exam.as_mut() {
                    view.editing = false;
                }
                self.submit(app, SubmitReason::Timeout);
            }
        }
    }

    fn handle_key(&mut self, app: &mut ClientApp, key: KeyEvent) {
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');

        match app.state.clone() {
            ClientState::Login => self.handle_login_key(app, key, ctrl_c),
            ClientState::ExamList => self.handle_exam_list_key(app, key.code, ctrl_c),
            ClientState::Results => self.handle_results_key(app, key.code, ctrl_c),
            ClientState::LoadingExam { .. } | ClientState::Submitting { .. } => {
                if ctrl_c {
                    self.close(app);
                }
            }
            ClientState::Exam => self.handle_exam_key(app, key, ctrl_c),
            ClientState::Notice { .. } => {
                if ctrl_c {
                    app.should_quit = true;
                } else {
                    self.refresh_exams(app);
                }
            }
        }
    }

    fn handle_login_key(&mut self, app: &mut ClientApp, key: KeyEvent, ctrl_c: bool) {
        if ctrl_c {
            app.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc => app.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                app.login.toggle_field()
            }
            KeyCode::Enter => self.login(app),
            KeyCode::Backspace => app.login.pop(),
            KeyCode::Char(c) => app.login.push(c),
            _ => {}
        }
    }

    fn handle_exam_list_key(&mut self, app: &mut ClientApp, key: KeyCode, ctrl_c: bool) {
        if ctrl_c {
            app.should_quit = true;
            return;
        }

        match key {
            KeyCode::Down | KeyCode::Char('j') => app.exams.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.exams.select_previous(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_exams(app),
            KeyCode::Char('v') | KeyCode::Char('V') => self.refresh_results(app),
            KeyCode::Enter => {
                let now = app.now;
                let exam_id = app
                    .exams
                    .selected_exam()
                    .filter(|exam| exam.can_start(now))
                    .map(|exam| exam.exam_id.clone());
                if let Some(exam_id) = exam_id {
                    self.open_exam(app, exam_id);
                }
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        }
    }

    fn handle_results_key(&mut self, app: &mut ClientApp, key: KeyCode, ctrl_c: bool) {
        if ctrl_c {
            app.should_quit = true;
            return;
        }

        match key {
            KeyCode::Down | KeyCode::Char('j') => app.results.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.results.select_previous(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_results(app),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.refresh_exams(app),
            KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
            _ => {}
        }
    }

    /// Quit request; goes through the navigation lock.
    fn close(&mut self, app: &mut ClientApp) {
        match app.lock.intercept(Intent::Close) {
            Verdict::Allow => app.should_quit = true,
            Verdict::Blocked(message) | Verdict::Confirm(message) => {
                if let Some(view) = app.exam.as_mut() {
                    view.status = Some(format!("{} Press again to quit.", message));
                }
            }
        }
    }

    fn handle_exam_key(&mut self, app: &mut ClientApp, key: KeyEvent, ctrl_c: bool) {
        if ctrl_c {
            self.close(app);
            return;
        }

        let run_pressed = key.code == KeyCode::F(5)
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r'));

        let Some(view) = app.exam.as_mut() else {
            return;
        };

        if view.confirm_submit {
            view.confirm_submit = false;
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.submit(app, SubmitReason::Manual);
            }
            return;
        }

        if view.editing {
            match key.code {
                KeyCode::Esc => view.blur(),
                _ if run_pressed => {
                    view.blur();
                    self.start_run(app);
                }
                KeyCode::Enter => view.type_char('\n'),
                KeyCode::Tab if view.controller.current_question().is_code() => {
                    for _ in 0..4 {
                        view.type_char(' ');
                    }
                }
                KeyCode::Backspace => view.backspace(),
                KeyCode::Char(c) => view.type_char(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if let Verdict::Blocked(message) = app.lock.intercept(Intent::Back) {
                    view.status = Some(message.to_string());
                }
                return;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.close(app);
                return;
            }
            _ => {}
        }

        app.lock.dismiss();
        view.status = None;

        if run_pressed {
            self.start_run(app);
            return;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                view.controller.previous_question();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                view.controller.next_question();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                view.controller.select_question(index);
            }
            KeyCode::Enter | KeyCode::Char('e') if view.current_is_editable() => {
                view.editing = true;
            }
            KeyCode::Char('S') => view.confirm_submit = true,
            KeyCode::Char(c) => {
                let is_choice = matches!(
                    view.controller.current_question().kind,
                    QuestionKind::SingleChoice { .. }
                );
                if let (true, Some(label)) = (is_choice, OptionLabel::from_char(c)) {
                    let id = view.current_id();
                    view.controller.choose_option(&id, label);
                }
            }
            _ => {}
        }
    }

    fn start_run(&mut self, app: &mut ClientApp) {
        let Some(view) = app.exam.as_mut() else {
            return;
        };
        if view.is_running() || !view.controller.current_question().is_code() {
            return;
        }

        let id = view.current_id();
        match view.controller.prepare_run(&id) {
            Ok(pending) => {
                view.running = Some(id.clone());
                view.run_error = None;
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = pending.execute().await;
                    let _ = tx.send(AppMessage::RunFinished {
                        question_id: id,
                        result,
                    });
                });
            }
            Err(err) => view.run_error = Some((id, err.user_message())),
        }
    }
}
