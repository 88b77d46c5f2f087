//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::{error, warn};

use crate::domain::errors::{BillError, DeserializationError, SplitError};
use crate::domain::task_assignment::TaskAssignmentError;

/// Error returned by every handler, rendered as `{ "error", "kind" }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    fn from_split(e: &SplitError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e.kind(), e.to_string())
    }

    fn from_bill(e: &BillError) -> Self {
        let (status, kind) = match e {
            BillError::Split(inner) => return Self::from_split(inner),
            BillError::EmptyDescription
            | BillError::DescriptionTooLong(..)
            | BillError::EmptyPayer
            | BillError::AmountTooLarge(_) => (StatusCode::BAD_REQUEST, "validation"),
            BillError::NotFound(_) | BillError::ShareNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            BillError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            BillError::AlreadySettled(_) => (StatusCode::CONFLICT, "conflict"),
        };
        Self::new(status, kind, e.to_string())
    }
}

impl From<SplitError> for ApiError {
    fn from(e: SplitError) -> Self {
        Self::from_split(&e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(split) = e.downcast_ref::<SplitError>() {
            return Self::from_split(split);
        }
        if let Some(bill) = e.downcast_ref::<BillError>() {
            return Self::from_bill(bill);
        }
        if let Some(task) = e.downcast_ref::<TaskAssignmentError>() {
            return Self::new(StatusCode::BAD_REQUEST, "invalid_input", task.to_string());
        }
        if let Some(decode) = e.downcast_ref::<DeserializationError>() {
            error!("Stored data could not be decoded: {}", decode);
            return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "deserialization", decode.to_string());
        }

        error!("Unhandled error: {:#}", e);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            warn!("Request rejected ({}): {}", self.status, self.message);
        }
        let body = ErrorResponse {
            error: self.message,
            kind: self.kind.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}
