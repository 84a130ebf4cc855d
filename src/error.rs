use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sea_orm::DbErr;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0}")]
  InvalidArgs(String),
  #[error("{0}")]
  Unauthorized(&'static str),
  #[error("Invalid or expired token")]
  InvalidToken,
  #[error("Forbidden: insufficient role")]
  Forbidden,
  #[error("{0}")]
  Conflict(String),

  #[error("Product not found")]
  ProductNotFound,
  #[error("Order not found")]
  OrderNotFound,
  #[error("Feedback not found")]
  FeedbackNotFound,
  #[error("User not found")]
  UserNotFound,

  #[error("Database error: {0}")]
  Db(#[from] DbErr),
  #[error("Fallback store failed: {0}")]
  Fallback(#[from] FallbackError),
  #[error("Token error: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),
  #[error("Internal error: {0}")]
  Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),
  #[error("json: {0}")]
  Json(#[from] json::Error),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Error::Unauthorized(_) | Error::InvalidToken => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::ProductNotFound
      | Error::OrderNotFound
      | Error::FeedbackNotFound
      | Error::UserNotFound => StatusCode::NOT_FOUND,
      Error::Db(_)
      | Error::Fallback(_)
      | Error::Jwt(_)
      | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self {
    Error::InvalidArgs(rejection.body_text())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    let message = if status.is_server_error() {
      tracing::error!("{self}");
      "Internal server error".to_string()
    } else {
      tracing::debug!("{status}: {self}");
      self.to_string()
    };

    let body = json::json!({ "ok": false, "success": false, "error": message });
    (status, Json(body)).into_response()
  }
}
