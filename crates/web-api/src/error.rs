use application::ApplicationError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
                field: None,
            },
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.body.field = Some(field.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal_server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error",
        )
    }

    fn conflict(field: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "CONFLICT", message).with_field(field)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use ApplicationError as AppErr;

        let message = error.to_string();
        match error {
            AppErr::Domain(domain) => domain_error(domain),
            AppErr::Repository(repo_err) => match repo_err {
                RepositoryError::NotFound => ApiError::not_found("requested resource not found"),
                RepositoryError::Conflict { field } => {
                    ApiError::conflict(&field, "resource already exists")
                }
                RepositoryError::Storage { message } => {
                    tracing::error!(error = %message, "storage failure");
                    ApiError::internal_server_error()
                }
            },
            AppErr::Password(_) | AppErr::Token(_) | AppErr::Captcha(_) => {
                tracing::error!(error = %message, "adapter failure");
                ApiError::internal_server_error()
            }
            AppErr::CaptchaRejected => ApiError::bad_request(message).with_field("recaptcha_token"),
            AppErr::PasswordMismatch => ApiError::bad_request(message).with_field("password"),
            AppErr::WeakPassword { reasons } => {
                ApiError::bad_request(reasons.join(" ")).with_field("password")
            }
            AppErr::UnknownEmail => ApiError::unauthorized(message).with_field("email"),
            AppErr::WrongPassword => ApiError::unauthorized(message).with_field("password"),
            AppErr::AccountDisabled => ApiError::forbidden(message),
            AppErr::TokenRejected(reason) => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_TOKEN", reason)
            }
            AppErr::Unauthenticated(reason) => ApiError::unauthorized(reason),
        }
    }
}

fn domain_error(error: DomainError) -> ApiError {
    let message = error.to_string();
    match error {
        DomainError::InvalidArgument { field, reason } => {
            ApiError::bad_request(reason).with_field(field)
        }
        DomainError::UsernameTaken => ApiError::conflict("username", message),
        DomainError::EmailTaken => ApiError::conflict("email", message),
        DomainError::TopicNameTaken => ApiError::conflict("topic", message),
        DomainError::UserNotFound
        | DomainError::RoomNotFound
        | DomainError::MessageNotFound
        | DomainError::TopicNotFound => ApiError::not_found(message),
        DomainError::NotRoomHost | DomainError::NotMessageAuthor => ApiError::forbidden(message),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::not_found(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
