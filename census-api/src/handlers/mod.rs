pub mod answers;
pub mod questions;
pub mod replies;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use actix_web::web;
use census::{Direction, Question};

/// Registers every census endpoint on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::InvalidRequest(err.to_string()).into()),
    )
    .service(questions::list_questions)
    .service(questions::create_question)
    .service(questions::get_question)
    .service(questions::set_question_status)
    .service(questions::move_question)
    .service(answers::create_answer)
    .service(answers::move_answer)
    .service(replies::list_replies)
    .service(replies::create_reply);
}

fn load_question(state: &AppState, id: i64) -> ApiResult<Question> {
    state
        .manager
        .question(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Question {id} not found")))
}

fn parse_direction(direction: &str) -> ApiResult<Direction> {
    direction
        .parse()
        .map_err(|e: census::ordering::UnknownDirection| ApiError::InvalidRequest(e.to_string()))
}
