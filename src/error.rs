use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_derive::Serialize;
use thiserror::Error;

/// Errors a client can see. Internal detail is logged where the error is
/// raised and never put in the response body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    #[error("bad request")]
    BadRequest,

    #[error("resource not found")]
    NotFound,

    #[error("unprocessable entity")]
    Unprocessable,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.to_string(),
        })
    }
}
