use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use error_types::{error_codes, ApiResponse};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden => 403,
            AppError::NotFound => 404,
            AppError::Config(_) | AppError::Database(_) | AppError::Internal => 500,
        }
    }

    /// Stable machine-readable code for the envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => error_codes::INVALID_REQUEST,
            AppError::Unauthorized => error_codes::INVALID_CREDENTIALS,
            AppError::Forbidden => error_codes::AUTHORIZATION_ERROR,
            AppError::NotFound => error_codes::NOT_FOUND,
            AppError::Database(_) => error_codes::DATABASE_ERROR,
            AppError::Config(_) | AppError::Internal => error_codes::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(AppError::status_code(self)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let body: ApiResponse<()> = ApiResponse::err(self.to_string(), self.code());
        HttpResponse::build(ResponseError::status_code(self)).json(body)
    }
}
