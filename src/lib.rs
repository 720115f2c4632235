//! # exam-client
//!
//! Terminal client for timed online exams.
//!
//! The [`session`] module holds the exam session controller: it loads the
//! questions and any saved answers of an attempt, keeps the answers in a
//! local buffer, saves each answer in the background when it is committed,
//! runs the countdown to the shared deadline and submits the attempt once,
//! either on request or when time runs out.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use exam_client::api::ApiClient;
//! use exam_client::api::AuthContext;
//! use exam_client::config::Settings;
//! use exam_client::models::ExamId;
//! use exam_client::session::{
//!     NavigationLock, SessionController, SessionServices, SubmitReason, SystemClock,
//! };
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let settings = Settings::load()?;
//! let api = ApiClient::from_settings(&settings)?.authorize(AuthContext::new("token", None));
//!
//! let services = SessionServices {
//!     api: Arc::new(api),
//!     clock: Arc::new(SystemClock),
//!     guard: Arc::new(NavigationLock::new()),
//! };
//! let (events, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut controller = SessionController::load(services, ExamId::Number(42), events).await?;
//!
//! controller.submit(SubmitReason::Manual).await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod terminal;

#[cfg(test)]
mod test_support;
