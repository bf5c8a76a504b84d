use crate::models::ErrorResponse;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use census::{CensusError, ReplyRejected, StorageError};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Census(#[from] CensusError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing or empty X-User-Id header")]
    Unauthorized,
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Census(err.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Census(CensusError::Rejected(rejected)) => match rejected {
                ReplyRejected::DuplicateReply { .. } | ReplyRejected::QuestionNotOpen { .. } => {
                    StatusCode::CONFLICT
                }
                ReplyRejected::AnswerNotFound { .. } => StatusCode::NOT_FOUND,
                ReplyRejected::InvalidAnswer { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::Census(CensusError::Validation { .. }) | ApiError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Census(CensusError::Storage(storage)) => match storage {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::UniqueViolation(_) => StatusCode::CONFLICT,
                StorageError::OperationFailed(_) | StorageError::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        })
    }
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Census(CensusError::Rejected(rejected)) => rejected.kind(),
            ApiError::Census(CensusError::Validation { .. }) => "validation_error",
            ApiError::Census(CensusError::Storage(StorageError::NotFound(_)))
            | ApiError::NotFound(_) => "not_found",
            ApiError::Census(CensusError::Storage(StorageError::UniqueViolation(_))) => "conflict",
            ApiError::Census(CensusError::Storage(_)) => "storage_error",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Unauthorized => "unauthorized",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use census::{QuestionStatus, UserId};

    #[test]
    fn test_rejections_map_to_http_statuses() {
        let cases = [
            (
                ReplyRejected::DuplicateReply {
                    question: "q".to_string(),
                    replier: UserId::from("alice"),
                },
                StatusCode::CONFLICT,
            ),
            (
                ReplyRejected::QuestionNotOpen {
                    question: "q".to_string(),
                    status: QuestionStatus::Draft,
                },
                StatusCode::CONFLICT,
            ),
            (
                ReplyRejected::AnswerNotFound {
                    question: "q".to_string(),
                    value: "maybe".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ReplyRejected::InvalidAnswer {
                    question: "q".to_string(),
                    answer: "yes".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (rejected, expected) in cases {
            let err = ApiError::Census(rejected.into());
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn test_storage_errors_map_to_http_statuses() {
        let err: ApiError = StorageError::UniqueViolation("code".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_type(), "conflict");

        let err: ApiError = StorageError::OperationFailed("Lock error".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
