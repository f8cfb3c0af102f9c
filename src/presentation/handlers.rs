// HTTP request handlers
use crate::application::refresh_orchestrator::RefreshOutcome;
use crate::domain::patient::PatientId;
use crate::domain::view::DashboardView;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ViewQuery {
    pub wait: Option<bool>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub outcome: RefreshOutcome,
    pub dashboard: DashboardView,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard for a patient; `?wait=true` blocks until it has loaded
pub async fn get_dashboard(
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardView>, StatusCode> {
    let patient = PatientId::parse(&id).ok_or(StatusCode::BAD_REQUEST)?;
    let dashboard = state.dashboards.open(patient).await;

    if query.wait.unwrap_or(false) {
        dashboard.wait_until_ready().await;
    }

    Ok(Json(dashboard.view(Utc::now())))
}

/// Re-fetch both sources and report the combined outcome
pub async fn refresh_dashboard(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, StatusCode> {
    let patient = PatientId::parse(&id).ok_or(StatusCode::BAD_REQUEST)?;
    let dashboard = state.dashboards.open(patient).await;

    let outcome = dashboard.refresh().await;
    Ok(Json(RefreshResponse {
        outcome,
        dashboard: dashboard.view(Utc::now()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_registry::{DashboardRegistry, DEFAULT_MAX_DASHBOARDS};
    use crate::application::test_support::{reading, FixedProvider, RecordingSink};

    fn state() -> Arc<AppState> {
        let provider = Arc::new(FixedProvider {
            vitals: vec![reading("v1"), reading("v2")],
            ..Default::default()
        });
        Arc::new(AppState {
            dashboards: DashboardRegistry::new(
                provider.clone(),
                provider,
                10,
                DEFAULT_MAX_DASHBOARDS,
                Arc::new(RecordingSink::default()),
            ),
        })
    }

    #[tokio::test]
    async fn test_get_dashboard_waits_for_load() {
        let Json(view) = get_dashboard(
            Path("p1".to_string()),
            Query(ViewQuery { wait: Some(true) }),
            State(state()),
        )
        .await
        .unwrap();

        assert!(!view.loading);
        assert_eq!(view.recent_vitals.len(), 2);
        assert_eq!(view.latest_vital.unwrap().reading.id, "v1");
    }

    #[tokio::test]
    async fn test_blank_patient_is_rejected() {
        let result = get_dashboard(Path(" ".to_string()), Query(ViewQuery { wait: None }), State(state())).await;
        assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_refresh_returns_outcome_and_view() {
        let state = state();
        let Json(response) = refresh_dashboard(Path("p1".to_string()), State(state.clone()))
            .await
            .unwrap();

        assert_eq!(response.outcome, RefreshOutcome::Refreshed);
        assert!(!response.dashboard.loading);
        assert_eq!(state.dashboards.len().await, 1);
    }
}
