//! Caller identity, taken from a header set by the fronting proxy.

use crate::error::ApiError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use census::UserId;
use std::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "X-User-Id";

/// The authenticated user making the request.
#[derive(Debug, Clone)]
pub struct Identity(pub UserId);

impl Identity {
    pub fn from_request_headers(req: &HttpRequest) -> Result<Self, ApiError> {
        req.headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Identity(UserId::from(value)))
            .ok_or(ApiError::Unauthorized)
    }
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Identity::from_request_headers(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_identity_from_header() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, " alice "))
            .to_http_request();
        let identity = Identity::from_request_headers(&req).unwrap();
        assert_eq!(identity.0.as_str(), "alice");
    }

    #[test]
    fn test_missing_or_blank_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            Identity::from_request_headers(&req),
            Err(ApiError::Unauthorized)
        ));

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "   "))
            .to_http_request();
        assert!(matches!(
            Identity::from_request_headers(&req),
            Err(ApiError::Unauthorized)
        ));
    }
}
