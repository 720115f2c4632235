//! Wire format of the exam service.

mod messages;
pub mod timestamp;

pub use messages::{
    LoginRequest, LoginResponse, QuestionPayload, RunCodeRequest, RunCodeResponse, StoredAnswer,
    SubmitAnswerRequest, DEFAULT_CODING_LANGUAGE,
};
