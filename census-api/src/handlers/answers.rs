use super::{load_question, parse_direction};
use crate::error::ApiResult;
use crate::identity::Identity;
use crate::models::{CreateAnswerRequest, MoveRequest, MoveResponse};
use crate::AppState;
use actix_web::{post, web, HttpResponse};
use census::NewAnswer;

#[post("/questions/{id}/answers")]
pub async fn create_answer(
    state: web::Data<AppState>,
    _identity: Identity,
    id: web::Path<i64>,
    request: web::Json<CreateAnswerRequest>,
) -> ApiResult<HttpResponse> {
    let question = load_question(&state, id.into_inner())?;
    let req = request.into_inner();
    let answer = state
        .manager
        .add_answer(&question, NewAnswer::new(req.value, req.text))?;
    Ok(HttpResponse::Created().json(answer))
}

/// Swaps the answer with its neighbour inside the same question.
#[post("/answers/{id}/move")]
pub async fn move_answer(
    state: web::Data<AppState>,
    _identity: Identity,
    id: web::Path<i64>,
    request: web::Json<MoveRequest>,
) -> ApiResult<HttpResponse> {
    let direction = parse_direction(&request.direction)?;
    let moved = state.manager.move_answer(id.into_inner(), direction)?;
    Ok(HttpResponse::Ok().json(MoveResponse { moved }))
}
