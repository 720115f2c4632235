//! Countdown to the session deadline.
//!
//! Remaining time is recomputed from the wall clock on every tick instead of
//! being decremented, so a suspended process catches up on wake.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::SessionEvent;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Whole seconds from `now` to `deadline`, floored and clamped at zero.
pub fn remaining_seconds(deadline: OffsetDateTime, now: OffsetDateTime) -> u64 {
    let left = deadline - now;
    if left.is_negative() {
        return 0;
    }
    u64::try_from(left.whole_seconds()).unwrap_or(0)
}

/// `MM:SS`; minutes are not wrapped into hours.
pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// A running countdown. Dropping it stops the tick task.
#[derive(Debug)]
pub struct Countdown {
    task: Option<JoinHandle<()>>,
    remaining: watch::Receiver<u64>,
}

impl Countdown {
    /// Starts counting down to `deadline`, publishing a [`SessionEvent::Tick`]
    /// each second and a single [`SessionEvent::Expired`] at zero.
    ///
    /// When the deadline has already passed, `Expired` is sent right away and
    /// no task is spawned.
    pub fn start(
        deadline: OffsetDateTime,
        clock: Arc<dyn Clock>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let initial = remaining_seconds(deadline, clock.now());
        let (remaining_tx, remaining) = watch::channel(initial);

        if initial == 0 {
            tracing::info!("Deadline already passed at session start");
            let _ = events.send(SessionEvent::Expired);
            return Self {
                task: None,
                remaining,
            };
        }

        let task = tokio::spawn(async move {
            let mut ticker = interval(std::time::Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let left = remaining_seconds(deadline, clock.now());
                let _ = remaining_tx.send(left);
                let _ = events.send(SessionEvent::Tick { remaining: left });

                if left == 0 {
                    tracing::info!("Countdown reached zero");
                    let _ = events.send(SessionEvent::Expired);
                    break;
                }
            }
        });

        Self {
            task: Some(task),
            remaining,
        }
    }

    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}
