use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use super::question::ExamId;
use crate::protocol::timestamp;

/// An exam assigned to the logged-in student.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummary {
    pub exam_id: ExamId,
    #[serde(default)]
    pub exam_name: String,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub end_time: Option<OffsetDateTime>,
    /// Duration in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub total_marks: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_completed: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamStatus {
    Upcoming,
    Live,
    Submitted,
    Expired,
}

impl ExamStatus {
    pub fn label(self) -> &'static str {
        match self {
            ExamStatus::Upcoming => "UPCOMING",
            ExamStatus::Live => "LIVE",
            ExamStatus::Submitted => "SUBMITTED",
            ExamStatus::Expired => "EXPIRED",
        }
    }
}

impl ExamSummary {
    pub fn status_at(&self, now: OffsetDateTime) -> ExamStatus {
        if self.is_completed {
            return ExamStatus::Submitted;
        }

        if let Some(start) = self.start_time {
            if now < start {
                return ExamStatus::Upcoming;
            }
        }

        match self.end_time {
            Some(end) if now > end => ExamStatus::Expired,
            _ => ExamStatus::Live,
        }
    }

    pub fn can_start(&self, now: OffsetDateTime) -> bool {
        self.status_at(now) == ExamStatus::Live && self.is_active && !self.is_completed
    }

    /// Time left until the exam opens (upcoming) or closes (live).
    pub fn countdown_at(&self, now: OffsetDateTime) -> Option<Duration> {
        let target = match self.status_at(now) {
            ExamStatus::Upcoming => self.start_time?,
            ExamStatus::Live => self.end_time?,
            ExamStatus::Submitted | ExamStatus::Expired => return None,
        };

        let left = target - now;
        (left > Duration::ZERO).then_some(left)
    }
}

/// Formats as `1h 2m 3s`, dropping the hour part when it is zero.
pub fn format_countdown(left: Duration) -> String {
    let total = left.whole_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
