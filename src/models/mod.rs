mod answer;
mod exam;
mod question;
mod result;

pub use answer::{Answer, AnswerPatch};
pub use exam::{format_countdown, ExamStatus, ExamSummary};
pub use question::{ExamId, OptionLabel, Question, QuestionId, QuestionKind, RecordId};
pub use result::ResultSummary;
