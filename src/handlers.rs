use crate::errors::AppError;
use crate::models::{Event, EventKind, LogRequest, RawEvent, StatsQuery};
use crate::state::AppState;
use crate::stats::{Bucket, TimeRange};
use crate::storage::EventStore;
use crate::ui::{render_index, render_stats};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Json,
};
use chrono::Utc;
use tracing::info;

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn stats_page() -> Html<String> {
    Html(render_stats())
}

pub async fn list_events<S: EventStore>(State(state): State<AppState<S>>) -> Json<Vec<RawEvent>> {
    Json(state.store.get_events().await)
}

pub async fn create_event<S: EventStore>(
    State(state): State<AppState<S>>,
    Json(payload): Json<LogRequest>,
) -> Result<Json<Event>, AppError> {
    let kind = payload
        .kind
        .trim()
        .parse::<EventKind>()
        .map_err(|_| AppError::bad_request("type must be 'emotional' or 'background'"))?;

    let event = record(&state, kind).await?;
    Ok(Json(event))
}

pub async fn clear_events<S: EventStore>(
    State(state): State<AppState<S>>,
) -> Result<StatusCode, AppError> {
    state.store.clear_events().await?;
    info!("cleared all events");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn log_emotional<S: EventStore>(
    State(state): State<AppState<S>>,
) -> Result<Redirect, AppError> {
    record(&state, EventKind::Emotional).await?;
    Ok(Redirect::to("/"))
}

pub async fn log_background<S: EventStore>(
    State(state): State<AppState<S>>,
) -> Result<Redirect, AppError> {
    record(&state, EventKind::Background).await?;
    Ok(Redirect::to("/"))
}

pub async fn get_stats<S: EventStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<StatsQuery>,
) -> Json<Vec<Bucket>> {
    let range = query.range.as_deref().unwrap_or(TimeRange::Day.as_str());
    let events = state.store.get_events().await;
    Json(state.zone.aggregate_named(&events, range, Utc::now()))
}

async fn record<S: EventStore>(state: &AppState<S>, kind: EventKind) -> Result<Event, AppError> {
    let event = state.store.log_event(kind).await?;
    info!(id = %event.id, kind = %event.kind, "logged event");
    Ok(event)
}
