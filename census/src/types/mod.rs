mod answer;
mod question;
mod reply;
mod user;

pub use answer::{Answer, AnswerChoice, NewAnswer};
pub use question::{
    NewQuestion, Question, QuestionStatus, QuestionSummary, QuestionType, UnknownStatus,
    UnknownType,
};
pub use reply::{NewReply, Reply};
pub use user::UserId;
