//! API handlers. List endpoints wrap their payload in a
//! `{ "data": ..., "total": n }` envelope; detail endpoints return
//! `{ "data": ... }` or an error body.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};

use pulse_core::{
    AgentStatus, AgentType, DataContext, FilterState, IncidentSeverity, IncidentStatus, Page,
    PulseError, SelectedEntity, Stage, PULSE_VERSION,
};
use pulse_metrics::compute_metrics;

use crate::AppState;

fn envelope<T: serde::Serialize>(items: &[T]) -> Json<Value> {
    Json(json!({ "data": items, "total": items.len() }))
}

fn single<T: serde::Serialize>(item: &T) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "data": item })))
}

fn error_response(err: PulseError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        PulseError::BadRequest(_) => StatusCode::BAD_REQUEST,
        PulseError::NotFound(_) => StatusCode::NOT_FOUND,
        PulseError::Api(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

// ============================================================================
// Publishers
// ============================================================================

pub async fn list_publishers(State(state): State<Arc<AppState>>) -> Json<Value> {
    envelope(&state.dataset.publishers)
}

pub async fn get_publisher(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.dataset.publisher(&id.as_str().into()) {
        Some(publisher) => single(publisher),
        None => error_response(PulseError::not_found("publisher", &id)),
    }
}

// ============================================================================
// Agents
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AgentQuery {
    pub publisher: Option<String>,
    pub status: Option<AgentStatus>,
    #[serde(rename = "type")]
    pub agent_type: Option<AgentType>,
    /// Case-insensitive substring match on the agent name.
    pub q: Option<String>,
}

pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AgentQuery>,
) -> Json<Value> {
    let needle = query.q.as_ref().map(|q| q.to_lowercase());
    let agents: Vec<_> = state
        .dataset
        .agents
        .iter()
        .filter(|a| {
            query
                .publisher
                .as_ref()
                .map_or(true, |p| a.publisher_id.as_str() == p)
        })
        .filter(|a| query.status.map_or(true, |s| a.status == s))
        .filter(|a| query.agent_type.map_or(true, |t| a.agent_type == t))
        .filter(|a| {
            needle
                .as_ref()
                .map_or(true, |n| a.name.to_lowercase().contains(n))
        })
        .collect();
    envelope(&agents)
}

pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.dataset.agent(&id.as_str().into()) {
        Some(agent) => single(agent),
        None => error_response(PulseError::not_found("agent", &id)),
    }
}

// ============================================================================
// Submissions, incidents, snapshots
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmissionQuery {
    pub agent: Option<String>,
    pub stage: Option<Stage>,
    /// Only submissions updated within the trailing window.
    pub days: Option<u32>,
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubmissionQuery>,
) -> Json<Value> {
    let from = query
        .days
        .map(|d| state.dataset.generated_at - Duration::days(d as i64));
    let submissions: Vec<_> = state
        .dataset
        .submissions
        .iter()
        .filter(|s| {
            query
                .agent
                .as_ref()
                .map_or(true, |a| s.agent_id.as_str() == a)
        })
        .filter(|s| query.stage.map_or(true, |st| s.stage == st))
        .filter(|s| from.map_or(true, |f| s.updated_at >= f))
        .collect();
    envelope(&submissions)
}

#[derive(Debug, Deserialize)]
pub struct IncidentQuery {
    pub status: Option<IncidentStatus>,
    pub severity: Option<IncidentSeverity>,
}

pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IncidentQuery>,
) -> Json<Value> {
    let incidents: Vec<_> = state
        .dataset
        .incidents
        .iter()
        .filter(|i| query.status.map_or(true, |s| i.status == s))
        .filter(|i| query.severity.map_or(true, |s| i.severity == s))
        .collect();
    envelope(&incidents)
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub days: Option<u32>,
}

pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SnapshotQuery>,
) -> Json<Value> {
    let from = query
        .days
        .map(|d| (state.dataset.generated_at - Duration::days(d as i64)).date_naive());
    let snapshots: Vec<_> = state
        .dataset
        .snapshots
        .iter()
        .filter(|s| from.map_or(true, |f| s.date >= f))
        .collect();
    envelope(&snapshots)
}

// ============================================================================
// Metrics
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub days: Option<u32>,
}

pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetricsQuery>,
) -> Json<Value> {
    let days = query.days.unwrap_or(30).clamp(1, 90);
    let metrics = compute_metrics(&state.dataset, days);
    Json(json!({ "data": metrics }))
}

// ============================================================================
// Copilot
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CopilotRequest {
    pub prompt: String,
    /// Page key, e.g. "overview" or "agent_detail".
    pub page: String,
    pub days: Option<u32>,
    pub agent_id: Option<String>,
    pub publisher_id: Option<String>,
}

/// The copilot endpoint. The server builds the `DataContext` itself:
/// metrics over the requested window, entity resolved from the dataset.
/// Blank prompts and unknown page keys are 400s; unknown entity ids are
/// 404s; a well-formed request always yields a response.
pub async fn copilot(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let request: CopilotRequest = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(err) => {
            return error_response(PulseError::BadRequest(format!("invalid request: {}", err)));
        }
    };
    if request.prompt.trim().is_empty() {
        return error_response(PulseError::BadRequest(
            "prompt must not be empty".to_string(),
        ));
    }
    let Some(page) = Page::parse(&request.page) else {
        return error_response(PulseError::BadRequest(format!(
            "unknown page '{}'",
            request.page
        )));
    };

    let days = request.days.unwrap_or(30).clamp(1, 90);
    let metrics = compute_metrics(&state.dataset, days);
    let mut context = DataContext::new(page).with_metrics(metrics);
    context.filters = FilterState {
        window_days: days,
        publisher: request.publisher_id.as_deref().map(Into::into),
        status: None,
    };

    if let Some(id) = &request.agent_id {
        match state.dataset.agent(&id.as_str().into()) {
            Some(agent) => {
                context = context.with_entity(SelectedEntity::Agent(agent.clone()));
            }
            None => return error_response(PulseError::not_found("agent", id)),
        }
    } else if let Some(id) = &request.publisher_id {
        match state.dataset.publisher(&id.as_str().into()) {
            Some(publisher) => {
                let at_risk = state
                    .dataset
                    .agents_of(&publisher.id)
                    .iter()
                    .filter(|a| a.status.is_at_risk())
                    .count();
                context = context
                    .with_entity(SelectedEntity::Publisher(publisher.clone()))
                    .with_at_risk_agents(at_risk);
            }
            None => return error_response(PulseError::not_found("publisher", id)),
        }
    }

    state.metrics.copilot_requests.inc();
    let response = state.engine.process(&request.prompt, &context);
    (StatusCode::OK, Json(json!(response)))
}

// ============================================================================
// Health and telemetry
// ============================================================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": PULSE_VERSION,
        "seed": state.dataset.seed,
        "agents": state.dataset.agents.len(),
        "submissions": state.dataset.submissions.len(),
    }))
}

pub async fn prometheus_metrics(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, String) {
    match state.metrics.encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encoding failed: {}", err),
        ),
    }
}
