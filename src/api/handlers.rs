//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, Mutation};
use super::responses::{ApiResponse, CountdownRequest, HealthResponse, StatusResponse};

/// Handle POST /increment
pub async fn increment_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let counter = state.increment();
    Json(ApiResponse::updated(
        format!("Count incremented to {}", counter.count),
        counter,
    ))
}

/// Handle POST /decrement - refused at zero
pub async fn decrement_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    match state.decrement() {
        (Mutation::Changed(count), counter) => Json(ApiResponse::updated(
            format!("Count decremented to {}", count),
            counter,
        )),
        (Mutation::Ineligible(_), counter) => Json(ApiResponse::ineligible(
            "Count is already 0".to_string(),
            counter,
        )),
    }
}

/// Handle POST /reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let counter = state.reset();
    Json(ApiResponse::updated("Count reset to 0".to_string(), counter))
}

/// Handle POST /countdown - arm the countdown for the next increment
pub async fn countdown_handler(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<CountdownRequest>>,
) -> Json<ApiResponse> {
    let input = payload.and_then(|Json(request)| request.input());

    match state.set_countdown(input.as_deref()) {
        Some(config) => {
            info!("Countdown endpoint called - {}s armed", config.seconds());
            Json(ApiResponse::armed(
                format!("Countdown of {}s starts on the next increment", config.seconds()),
                state.snapshot(),
            ))
        }
        None => Json(ApiResponse::ignored(
            "Countdown unchanged".to_string(),
            state.snapshot(),
        )),
    }
}

/// Handle GET /status - Return current counter status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        counter: state.snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream counter events as server-sent events
///
/// The stream opens with a `snapshot` event carrying the current screen.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.subscribe();
    let initial = Event::default()
        .event("snapshot")
        .json_data(state.snapshot())
        .ok();

    let updates = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match Event::default().event(event.name()).json_data(event) {
                    Ok(sse) => return Some((Ok::<_, Infallible>(sse), receiver)),
                    Err(e) => warn!("Failed to encode {:?}: {}", event, e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, {} event(s) skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let events = stream::iter(initial.map(Ok::<_, Infallible>)).chain(updates);
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
