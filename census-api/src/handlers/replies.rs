use super::load_question;
use crate::error::ApiResult;
use crate::identity::Identity;
use crate::models::{ReplyListResponse, ReplyRequest, ReplyResponse};
use crate::AppState;
use actix_web::{get, post, web, HttpResponse};
use census::AnswerChoice;

#[get("/questions/{id}/replies")]
pub async fn list_replies(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let question = load_question(&state, id.into_inner())?;
    let replies = state
        .manager
        .replies(&question)?
        .into_iter()
        .map(ReplyResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(ReplyListResponse { replies }))
}

#[post("/questions/{id}/replies")]
pub async fn create_reply(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<i64>,
    request: web::Json<ReplyRequest>,
) -> ApiResult<HttpResponse> {
    let question = load_question(&state, id.into_inner())?;
    let req = request.into_inner();

    let reply = state.manager.reply(
        &question,
        &identity.0,
        req.answer.map(AnswerChoice::Value),
        &req.text,
    )?;
    Ok(HttpResponse::Created().json(ReplyResponse::from(reply)))
}
