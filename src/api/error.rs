//! HTTP error mapping.
//!
//! Service errors collapse into a status code and a client-safe message.
//! Infrastructure failures are logged server-side and surface as an opaque
//! 500 so persistence details never leak over the wire.

use crate::activity::ports::ActivityLogError;
use crate::task::{
    domain::TaskDomainError,
    ports::{AttachmentStoreError, PaymentRepositoryError, TaskRepositoryError},
    services::{FieldEventError, TaskLifecycleError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// A client-facing error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Builds an error with the given status and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A 400 for malformed requests (bad headers, unreadable multipart).
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// A 422 for well-formed requests with invalid field values.
    #[must_use]
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

fn from_domain(err: &TaskDomainError) -> ApiError {
    let status = match err {
        TaskDomainError::AdminRequired { .. } | TaskDomainError::NotAssigned { .. } => {
            StatusCode::FORBIDDEN
        }
        TaskDomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
        TaskDomainError::EmptyTaskName
        | TaskDomainError::InvalidCoordinates { .. }
        | TaskDomainError::InvalidAccuracy(_)
        | TaskDomainError::NegativeExpectedRevenue(_)
        | TaskDomainError::NonPositivePaymentAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    ApiError::new(status, err.to_string())
}

fn from_repository(err: &TaskRepositoryError) -> ApiError {
    match err {
        TaskRepositoryError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
        TaskRepositoryError::StatusConflict { .. } => {
            ApiError::new(StatusCode::CONFLICT, err.to_string())
        }
        TaskRepositoryError::Persistence(source) => {
            tracing::error!(error = %source, "task repository failure");
            ApiError::internal()
        }
    }
}

fn from_payments(err: &PaymentRepositoryError) -> ApiError {
    match err {
        PaymentRepositoryError::DuplicatePayment(_) => {
            ApiError::new(StatusCode::CONFLICT, err.to_string())
        }
        PaymentRepositoryError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
        PaymentRepositoryError::Persistence(source) => {
            tracing::error!(error = %source, "payment repository failure");
            ApiError::internal()
        }
    }
}

fn from_storage(err: &AttachmentStoreError) -> ApiError {
    match err {
        AttachmentStoreError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
        AttachmentStoreError::Infrastructure(source) => {
            tracing::error!(error = %source, "attachment storage failure");
            ApiError::internal()
        }
    }
}

fn from_log(err: &ActivityLogError) -> ApiError {
    let ActivityLogError::Infrastructure(source) = err;
    tracing::error!(error = %source, "activity log failure");
    ApiError::internal()
}

impl From<ActivityLogError> for ApiError {
    fn from(err: ActivityLogError) -> Self {
        from_log(&err)
    }
}

impl From<FieldEventError> for ApiError {
    fn from(err: FieldEventError) -> Self {
        match err {
            FieldEventError::TaskNotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            FieldEventError::InvalidField { .. }
            | FieldEventError::PaymentAmountWithoutCollected
            | FieldEventError::MissingPaymentAmount
            | FieldEventError::InvoiceWithoutCollected => Self::unprocessable(err.to_string()),
            FieldEventError::Domain(inner) => from_domain(&inner),
            FieldEventError::Repository(inner) => from_repository(&inner),
            FieldEventError::Payments(inner) => from_payments(&inner),
            FieldEventError::Storage(inner) => from_storage(&inner),
            FieldEventError::Log(inner) => from_log(&inner),
        }
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        match err {
            TaskLifecycleError::TaskNotFound(_) | TaskLifecycleError::PaymentNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            TaskLifecycleError::Domain(inner) => from_domain(&inner),
            TaskLifecycleError::Repository(inner) => from_repository(&inner),
            TaskLifecycleError::Payments(inner) => from_payments(&inner),
            TaskLifecycleError::Storage(inner) => from_storage(&inner),
            TaskLifecycleError::Log(inner) => from_log(&inner),
        }
    }
}
