//! HTTP control surface.
//!
//! Each route maps onto one scheduler operation and translates its result
//! into a status code and JSON body. No scheduling decisions are made here.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;

use crate::scenario::ScenarioMetadata;
use crate::scheduler::{RunStatus, Scheduler, SchedulerError, StartOutcome, StopOutcome};
use crate::time::TimeSource;

/// Build the control router over `scheduler`.
pub fn router<T: TimeSource>(scheduler: Scheduler<T>) -> Router {
    Router::new()
        .route("/attack/start/{name}", post(start::<T>))
        .route("/attack/stop/{name}", post(stop::<T>))
        .route("/attack/status", get(status::<T>))
        .route("/attack/scenarios", get(scenarios::<T>))
        .with_state(scheduler)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum StartState {
    Started,
    AlreadyRunning,
    Conflict,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    status: StartState,
    scenario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<u64>,
    conflict: bool,
}

#[derive(Debug, Serialize)]
struct StopResponse {
    status: &'static str,
    scenario: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct ScenarioSummary<'a> {
    id: &'a str,
    #[serde(flatten)]
    metadata: Option<&'a ScenarioMetadata>,
}

async fn start<T: TimeSource>(
    State(scheduler): State<Scheduler<T>>,
    Path(name): Path<String>,
) -> Response {
    match scheduler.start_scenario(&name) {
        Ok(outcome) => {
            let status = match outcome {
                StartOutcome::Started(_) => StartState::Started,
                StartOutcome::AlreadyRunning(_) => StartState::AlreadyRunning,
            };
            let RunStatus {
                scenario,
                started_at,
            } = outcome.status().clone();
            Json(StartResponse {
                status,
                scenario,
                active: None,
                started_at: Some(started_at),
                conflict: false,
            })
            .into_response()
        }
        Err(SchedulerError::ScenarioConflict { requested, active }) => (
            StatusCode::CONFLICT,
            Json(StartResponse {
                status: StartState::Conflict,
                scenario: requested,
                active: Some(active),
                started_at: None,
                conflict: true,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn stop<T: TimeSource>(
    State(scheduler): State<Scheduler<T>>,
    Path(name): Path<String>,
) -> Response {
    match scheduler.stop_scenario(&name) {
        Ok(outcome) => {
            if outcome == StopOutcome::NotRunning {
                tracing::debug!("stop requested for '{name}', which is not running");
            }
            Json(StopResponse {
                status: "stopped",
                scenario: name,
            })
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn status<T: TimeSource>(State(scheduler): State<Scheduler<T>>) -> Response {
    match scheduler.status() {
        Ok(status) => Json(status).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn scenarios<T: TimeSource>(State(scheduler): State<Scheduler<T>>) -> Response {
    let summaries: Vec<ScenarioSummary<'_>> = scheduler
        .registry()
        .iter()
        .map(|descriptor| ScenarioSummary {
            id: &descriptor.id,
            metadata: descriptor.metadata.as_ref(),
        })
        .collect();
    Json(summaries).into_response()
}

fn error_response(error: &SchedulerError) -> Response {
    let code = match error {
        SchedulerError::UnknownScenario(_) => StatusCode::NOT_FOUND,
        SchedulerError::ScenarioConflict { .. } => StatusCode::CONFLICT,
        SchedulerError::NoRuntime | SchedulerError::LockPoisoned => {
            tracing::error!("control request failed: {error}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        code,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
