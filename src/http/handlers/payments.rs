use crate::domain::payment::{err, PaymentTask};
use crate::queue::admission::{Admission, RejectReason};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

/// Validates the body, then queues it raw for a worker. Nothing here waits on
/// a processor.
pub async fn create_payment(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let raw = match body {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("failed to read payment body: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(err("BODY_READ_ERROR", &e.body_text())),
            )
                .into_response();
        }
    };

    if let Err(e) = PaymentTask::decode(&raw) {
        tracing::warn!("rejecting undecodable payment: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(err("INVALID_PAYMENT", &e.to_string())),
        )
            .into_response();
    }

    match state.queue.enqueue(raw) {
        Admission::Accepted => StatusCode::CREATED.into_response(),
        Admission::Rejected(reason) => {
            let message = match reason {
                RejectReason::Full => "admission queue is full",
                RejectReason::Closed => "service is shutting down",
            };
            tracing::warn!(depth = state.queue.len(), "payment rejected: {}", message);
            (StatusCode::SERVICE_UNAVAILABLE, Json(err("QUEUE_FULL", message))).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FailedQuery {
    pub limit: Option<usize>,
}

pub async fn list_failed(
    State(state): State<AppState>,
    Query(query): Query<FailedQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(100).min(1000);
    match state.store.recent_abandoned(limit).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            tracing::error!("failed to read abandoned payments: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(err("STORE_UNAVAILABLE", &e.to_string())),
            )
                .into_response()
        }
    }
}
