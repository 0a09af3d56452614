use crate::booking::BookingError;
use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} for {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// A confirmation was rejected or failed
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// Storage operation error outside a confirmation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Booking(err) => match err {
                BookingError::NoDogsSelected | BookingError::NoDatesSelected | BookingError::DogNotEligible(_) => {
                    StatusCode::BAD_REQUEST
                }
                BookingError::NoActiveSubscription => StatusCode::PAYMENT_REQUIRED,
                BookingError::InsufficientDaysRemaining { .. }
                | BookingError::DateNoLongerAvailable(_)
                | BookingError::DayAtCapacity { .. } => StatusCode::CONFLICT,
                BookingError::Contention(_) => StatusCode::SERVICE_UNAVAILABLE,
                BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Store(err) => match err {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Contention(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::UniqueViolation { .. } | StoreError::CheckViolation { .. } | StoreError::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Machine-readable error code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest { .. } => "bad_request",
            Error::NotFound { .. } => "not_found",
            Error::Booking(err) => err.reason(),
            Error::Store(StoreError::NotFound) => "not_found",
            Error::Store(StoreError::Contention(_)) => "contention",
            Error::Internal { .. } | Error::Store(_) | Error::Other(_) => "internal_error",
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { .. } => self.to_string(),
            Error::Booking(BookingError::Storage(_)) => "Booking could not be saved, please try again".to_string(),
            Error::Booking(err) => err.to_string(),
            Error::Store(StoreError::NotFound) => "Resource not found".to_string(),
            Error::Store(StoreError::Contention(_)) => "Service busy, please try again".to_string(),
            Error::Internal { .. } | Error::Store(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Extra fields merged into the JSON body so clients can react without parsing messages
    fn details(&self) -> Value {
        match self {
            Error::Booking(BookingError::InsufficientDaysRemaining {
                requested,
                remaining,
                deficit,
            }) => json!({ "requested": requested, "remaining": remaining, "deficit": deficit }),
            Error::Booking(BookingError::DateNoLongerAvailable(date)) => json!({ "date": date }),
            Error::Booking(BookingError::DogNotEligible(dog_id)) => json!({ "dog_id": dog_id }),
            Error::Booking(BookingError::DayAtCapacity { date, capacity }) => json!({ "date": date, "capacity": capacity }),
            Error::Booking(err) if err.is_retryable() => json!({ "retryable": true }),
            Error::Store(StoreError::Contention(_)) => json!({ "retryable": true }),
            _ => json!({}),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Different log levels based on severity
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Internal service error: {:#}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let mut body = json!({
            "code": self.code(),
            "message": self.user_message(),
        });
        if let (Value::Object(body), Value::Object(details)) = (&mut body, self.details()) {
            body.extend(details);
        }

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
