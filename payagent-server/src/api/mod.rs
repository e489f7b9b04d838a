//! Payments API handlers.
//!
//! # Endpoints
//!
//! - `POST /payments`               create a payment request and start listening
//! - `GET  /payments/{id}`          current status and, once finished, the outcome
//! - `POST /payments/{id}/cancel`   stop listening for a payment

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use payagent_core::agent::{InvocationError, RegistryError};

use crate::state::AppState;

mod payments;

/// Build the Payments API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", post(payments::create_payment))
        .route("/payments/{request_id}", get(payments::get_payment_status))
        .route(
            "/payments/{request_id}/cancel",
            post(payments::cancel_payment),
        )
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Payments API handlers.
#[derive(Debug)]
enum PaymentsApiError {
    /// The agent refused the request.
    Invocation(InvocationError),
    /// The requested payment was not found.
    NotFound,
}

impl From<InvocationError> for PaymentsApiError {
    fn from(e: InvocationError) -> Self {
        match e {
            InvocationError::Registry(RegistryError::NotFound(_)) => PaymentsApiError::NotFound,
            other => PaymentsApiError::Invocation(other),
        }
    }
}

impl IntoResponse for PaymentsApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            PaymentsApiError::NotFound => {
                (StatusCode::NOT_FOUND, "payment not found").into_response()
            }
            PaymentsApiError::Invocation(e @ InvocationError::Registry(_)) => {
                (StatusCode::CONFLICT, e.to_string()).into_response()
            }
            PaymentsApiError::Invocation(e) => {
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
        }
    }
}
