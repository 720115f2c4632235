use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier of a server-side record (exam or question).
///
/// The service hands out numeric ids, but string ids are accepted as well so
/// the client never has to guess the backend's key type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

pub type ExamId = RecordId;
pub type QuestionId = RecordId;

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Number(id)
    }
}

impl From<&str> for RecordId {
    /// Numeric strings become numeric ids, so `"42"` from the command line
    /// matches the `42` the server sends.
    fn from(id: &str) -> Self {
        let id = id.trim();
        match id.parse::<i64>() {
            Ok(number) => RecordId::Number(number),
            Err(_) => RecordId::Text(id.to_string()),
        }
    }
}

/// Label of a single-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn index(self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }

    /// Parses `a`-`d` in either case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    SingleChoice { options: [String; 4] },
    FreeText,
    Code { language: String },
}

/// A question as presented to the student. The correct option is never part
/// of this type.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub kind: QuestionKind,
    /// End of the answering window; shared by every question of a session.
    pub ends_at: Option<OffsetDateTime>,
}

impl Question {
    pub fn option(&self, label: OptionLabel) -> Option<&str> {
        match &self.kind {
            QuestionKind::SingleChoice { options } => Some(options[label.index()].as_str()),
            _ => None,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self.kind, QuestionKind::Code { .. })
    }

    pub fn is_free_text(&self) -> bool {
        matches!(self.kind, QuestionKind::FreeText)
    }
}
