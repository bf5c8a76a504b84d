use census::{Answer, Question, QuestionSummary, Reply};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    /// `text`, `single` or `multi`; `single` when omitted.
    pub question_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: String,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub moved: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    /// Slug of the chosen answer.
    pub answer: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionListResponse {
    pub questions: Vec<QuestionSummary>,
}

#[derive(Debug, Serialize)]
pub struct QuestionDetailResponse {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
    pub reply_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    #[serde(flatten)]
    pub reply: Reply,
    pub counter: i64,
}

impl From<Reply> for ReplyResponse {
    fn from(reply: Reply) -> Self {
        let counter = reply.counter();
        Self { reply, counter }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplyListResponse {
    pub replies: Vec<ReplyResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
