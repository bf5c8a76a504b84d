use super::{load_question, parse_direction};
use crate::error::{ApiError, ApiResult};
use crate::identity::Identity;
use crate::models::{
    CreateQuestionRequest, MoveRequest, MoveResponse, QuestionDetailResponse,
    QuestionListResponse, StatusRequest,
};
use crate::AppState;
use actix_web::{get, post, web, HttpResponse};
use census::types::UnknownStatus;
use census::{NewQuestion, QuestionStatus, QuestionType};
use tracing::info;

#[get("/questions")]
pub async fn list_questions(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let questions = state.manager.questions()?;
    Ok(HttpResponse::Ok().json(QuestionListResponse { questions }))
}

#[post("/questions")]
pub async fn create_question(
    state: web::Data<AppState>,
    identity: Identity,
    request: web::Json<CreateQuestionRequest>,
) -> ApiResult<HttpResponse> {
    let req = request.into_inner();
    let question_type = match req.question_type.as_deref() {
        Some(raw) => raw
            .parse::<QuestionType>()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
        None => QuestionType::default(),
    };

    let mut new_question = NewQuestion::new(req.code, req.title, identity.0)
        .with_type(question_type)
        .with_description(req.description);
    new_question.short_description = req.short_description;

    let question = state.manager.create_question(new_question)?;
    Ok(HttpResponse::Created().json(question))
}

#[get("/questions/{id}")]
pub async fn get_question(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let question = load_question(&state, id.into_inner())?;
    let answers = state.manager.answers(&question)?;
    let reply_count = state.manager.reply_count(&question)?;

    Ok(HttpResponse::Ok().json(QuestionDetailResponse {
        question,
        answers,
        reply_count,
    }))
}

#[post("/questions/{id}/status")]
pub async fn set_question_status(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<i64>,
    request: web::Json<StatusRequest>,
) -> ApiResult<HttpResponse> {
    let status: QuestionStatus = request
        .status
        .parse()
        .map_err(|e: UnknownStatus| ApiError::InvalidRequest(e.to_string()))?;

    let mut question = load_question(&state, id.into_inner())?;
    info!(
        question_id = question.id,
        user = %identity.0,
        status = %status,
        "Status change requested"
    );
    state.manager.set_status(&mut question, status)?;

    Ok(HttpResponse::Ok().json(question))
}

#[post("/questions/{id}/move")]
pub async fn move_question(
    state: web::Data<AppState>,
    _identity: Identity,
    id: web::Path<i64>,
    request: web::Json<MoveRequest>,
) -> ApiResult<HttpResponse> {
    let direction = parse_direction(&request.direction)?;
    let moved = state.manager.move_question(id.into_inner(), direction)?;
    Ok(HttpResponse::Ok().json(MoveResponse { moved }))
}
