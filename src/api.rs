//! HTTP handlers and router

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::chain::Notification;
use crate::error::{AppError, Result};
use crate::models::{CreateSubmissionRequest, GuidanceTopic, Submission};
use crate::registry::Trainee;
use crate::session::{resolve_role, Role};
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/queue", get(list_queue))
        .route("/queue/:id/approve", post(approve))
        .route("/queue/:id/reject", post(reject))
        .route("/submissions", post(create_submission))
        .route("/guidance/:task_key", get(get_guidance))
        .route("/onboard", get(list_onboard))
        .with_state(state)
}

/// Outcome of an approve/reject call: the submission after the transition
/// plus the transient notification the client should render
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub submission: Submission,
    pub notification: Notification,
}

/// Resolve the reviewer from the forwarded session record.
/// Missing or unresolvable records are unauthenticated.
fn reviewer(headers: &HeaderMap) -> Result<Role> {
    let raw = headers
        .get("x-session")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing session record".to_string()))?;

    resolve_role(raw)
        .ok_or_else(|| AppError::Unauthorized("Unresolvable session record".to_string()))
}

async fn health() -> &'static str {
    "ok"
}

async fn list_queue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Submission>>> {
    let role = reviewer(&headers)?;
    let submissions = state.chain.list_visible(&role).await?;
    Ok(Json(submissions))
}

async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>> {
    let role = reviewer(&headers)?;
    let outcome = state.chain.approve(id, &role).await?;
    Ok(Json(DecisionResponse {
        notification: outcome.notice(),
        submission: outcome.submission().clone(),
    }))
}

async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>> {
    let role = reviewer(&headers)?;
    let submission = state.chain.reject(id, &role).await?;
    Ok(Json(DecisionResponse {
        submission,
        notification: Notification::success("Task rejected and returned to trainee"),
    }))
}

async fn create_submission(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<Json<Submission>> {
    if req.trainee.is_empty() || req.task.is_empty() || req.department.is_empty() {
        return Err(AppError::BadRequest(
            "trainee, task and department are required".to_string(),
        ));
    }
    let submission = state.store.create_submission(req).await?;
    Ok(Json(submission))
}

async fn get_guidance(
    State(state): State<Arc<AppState>>,
    Path(task_key): Path<String>,
) -> Result<Json<GuidanceTopic>> {
    let topic = state
        .store
        .get_guidance(&task_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No guidance for task {}", task_key)))?;
    Ok(Json(topic))
}

async fn list_onboard(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Trainee>>> {
    let trainees = state.registry.list_onboard().await?;
    Ok(Json(trainees))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reviewer_missing_header() {
        let headers = HeaderMap::new();
        let result = reviewer(&headers);
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized(_)));
    }

    #[test]
    fn test_reviewer_malformed_record() {
        let mut headers = HeaderMap::new();
        headers.insert("x-session", "not json".parse().unwrap());
        let result = reviewer(&headers);
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized(_)));
    }

    #[test]
    fn test_reviewer_master() {
        let mut headers = HeaderMap::new();
        headers.insert("x-session", r#"{"role": "MASTER"}"#.parse().unwrap());
        assert_eq!(reviewer(&headers).unwrap(), Role::Master);
    }

    #[test]
    fn test_reviewer_technical_expert() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-session",
            r#"{"role": "CTO", "department": "Engine"}"#.parse().unwrap(),
        );
        assert_eq!(
            reviewer(&headers).unwrap(),
            Role::TechnicalExpert {
                department: "Engine".to_string()
            }
        );
    }
}
