use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Session id taken from the `{session_id}` path segment.
///
/// Only the shape is checked here; whether the session exists is up to the
/// service, since a resume may restore it from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

impl FromRequest for SessionId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_path_id(req, "session_id").map(SessionId))
    }
}

/// Parse a uuid path parameter, failing with `INVALID_ID`.
pub fn parse_path_id(req: &HttpRequest, name: &str) -> Result<Uuid, AppError> {
    let raw = req.match_info().get(name).ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidId, format!("Missing {name} parameter"))
    })?;
    Uuid::parse_str(raw)
        .map_err(|_| AppError::bad_request(ErrorCode::InvalidId, format!("Invalid id: {raw}")))
}
