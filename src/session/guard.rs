//! Protection against leaving an attempt by accident.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const BACK_BLOCKED_MESSAGE: &str = "Navigation is disabled during the exam.";
pub const CLOSE_WARNING_MESSAGE: &str = "Warning: Leaving now will submit your exam.";

/// Something that can intercept navigation for the lifetime of a session.
pub trait SessionGuard: Send + Sync {
    fn install(&self);
    fn teardown(&self);
}

/// Installs a guard on creation and tears it down on drop.
pub struct GuardHandle {
    guard: Arc<dyn SessionGuard>,
}

impl GuardHandle {
    pub fn install(guard: Arc<dyn SessionGuard>) -> Self {
        guard.install();
        Self { guard }
    }
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.guard.teardown();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Leave the current screen for the previous one.
    Back,
    /// Quit the application.
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Blocked(&'static str),
    /// Ask again; a second `Close` in a row goes through.
    Confirm(&'static str),
}

/// Terminal implementation of [`SessionGuard`].
///
/// While installed, `Back` is refused and `Close` needs to be repeated. Any
/// other key resets a pending close via [`NavigationLock::dismiss`].
#[derive(Debug, Clone, Default)]
pub struct NavigationLock {
    state: Arc<LockState>,
}

#[derive(Debug, Default)]
struct LockState {
    installed: AtomicBool,
    close_pending: AtomicBool,
}

impl NavigationLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self) -> bool {
        self.state.installed.load(Ordering::SeqCst)
    }

    pub fn intercept(&self, intent: Intent) -> Verdict {
        if !self.is_installed() {
            return Verdict::Allow;
        }

        match intent {
            Intent::Back => {
                self.dismiss();
                Verdict::Blocked(BACK_BLOCKED_MESSAGE)
            }
            Intent::Close => {
                if self.state.close_pending.swap(true, Ordering::SeqCst) {
                    self.dismiss();
                    Verdict::Allow
                } else {
                    Verdict::Confirm(CLOSE_WARNING_MESSAGE)
                }
            }
        }
    }

    pub fn dismiss(&self) {
        self.state.close_pending.store(false, Ordering::SeqCst);
    }

    pub fn close_pending(&self) -> bool {
        self.state.close_pending.load(Ordering::SeqCst)
    }
}

impl SessionGuard for NavigationLock {
    fn install(&self) {
        self.dismiss();
        self.state.installed.store(true, Ordering::SeqCst);
        tracing::debug!("Navigation lock installed");
    }

    fn teardown(&self) {
        self.state.installed.store(false, Ordering::SeqCst);
        self.dismiss();
        tracing::debug!("Navigation lock removed");
    }
}
