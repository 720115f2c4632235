//! The timed exam session: answer buffer, autosave, countdown, navigation
//! guard and the controller that owns them.

mod autosave;
mod buffer;
mod clock;
mod controller;
mod guard;
mod state;

pub use autosave::{AutosaveDispatcher, AutosaveError};
pub use buffer::AnswerBuffer;
pub use clock::{format_remaining, remaining_seconds, Clock, Countdown, SystemClock};
pub use controller::{
    PendingRun, RunError, SessionController, SessionServices, SubmitError, SubmitOutcome,
    SubmitReason, SUBMITTED_NOTICE, TIMEOUT_NOTICE, UNCONFIRMED_NOTICE,
};
pub use guard::{
    GuardHandle, Intent, NavigationLock, SessionGuard, Verdict, BACK_BLOCKED_MESSAGE,
    CLOSE_WARNING_MESSAGE,
};
pub use state::{LoadError, Session};

/// Published by the countdown while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Tick { remaining: u64 },
    /// Sent once, when the deadline is reached.
    Expired,
}
