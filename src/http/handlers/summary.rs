use crate::domain::payment::err;
use crate::service::summary_service::summarize;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn payments_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let from = parse_bound("from", query.from.as_deref());
    let to = parse_bound("to", query.to.as_deref());

    match summarize(state.store.as_ref(), from, to).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("payments summary failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(err("SUMMARY_UNAVAILABLE", &e.to_string())),
            )
                .into_response()
        }
    }
}

/// Missing, empty and unparseable bounds all leave that side of the window open.
fn parse_bound(name: &str, v: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = v.map(str::trim).filter(|s| !s.is_empty())?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(bound = name, value = raw, "ignoring unparseable summary bound: {}", e);
            None
        }
    }
}
