use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use typeb_core::TypebError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(TypebError::InvalidValue(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<TypebError>() {
            match e {
                TypebError::NotInitialized => StatusCode::BAD_REQUEST,
                TypebError::FamilyNotFound(_)
                | TypebError::TaskNotFound(_)
                | TypebError::MemberNotFound(_)
                | TypebError::EntryNotFound(_) => StatusCode::NOT_FOUND,
                TypebError::FamilyExists(_)
                | TypebError::AlreadyMember(_)
                | TypebError::FamilyFull { .. }
                | TypebError::LastParent => StatusCode::CONFLICT,
                TypebError::InvalidId(_)
                | TypebError::InvalidValue(_)
                | TypebError::InvalidInviteCode(_) => StatusCode::BAD_REQUEST,
                TypebError::WebhookSignature => StatusCode::UNAUTHORIZED,
                TypebError::PhotoRequired | TypebError::InvalidTransition { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                TypebError::Io(_) | TypebError::Yaml(_) | TypebError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
