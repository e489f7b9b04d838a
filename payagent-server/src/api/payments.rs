use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use payagent_sdk::objects::CreatePaymentRequest;
use uuid::Uuid;

use super::PaymentsApiError;
use crate::state::AppState;

/// `POST /payments`: create a payment request.
///
/// Starts a listener for the payment and returns the details the payer
/// needs right away. The distribution happens in the background.
pub(super) async fn create_payment(
    state: State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let details = state.agent.create_payment(body).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// `GET /payments/{request_id}`: poll payment status.
pub(super) async fn get_payment_status(
    state: State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let status = state
        .agent
        .payment_status(request_id)
        .await
        .ok_or(PaymentsApiError::NotFound)?;
    Ok(Json(status))
}

/// `POST /payments/{request_id}/cancel`: stop listening for a payment.
///
/// Has no effect on a payment whose distribution already started.
pub(super) async fn cancel_payment(
    state: State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let status = state.agent.cancel_payment(request_id).await?;
    Ok(Json(status))
}
