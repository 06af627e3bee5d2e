use crate::handlers;
use crate::state::AppState;
use crate::storage::EventStore;
use axum::{routing::{get, post}, Router};

pub fn router<S: EventStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/stats", get(handlers::stats_page))
        .route("/log/emotional", post(handlers::log_emotional::<S>))
        .route("/log/background", post(handlers::log_background::<S>))
        .route(
            "/api/events",
            get(handlers::list_events::<S>)
                .post(handlers::create_event::<S>)
                .delete(handlers::clear_events::<S>),
        )
        .route("/api/stats", get(handlers::get_stats::<S>))
        .with_state(state)
}
