//! Webhook surface: event dispatch and review runs.
//!
//! `pull_request` deliveries with a review-eligible action run the pipeline
//! against the pull request's changed files; merged closes trigger the
//! hosting activation sweep; everything else is acknowledged and ignored.
//! A pipeline failure propagates to the delivering collaborator as a 500.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use vigil_config::{HostingSettings, ReviewSettings};
use vigil_github::{
    GithubClient, HEADER_GITHUB_EVENT, IssueCommenter, PullRequestEvent, PullRequestInfo,
};
use vigil_review::{ContentFetcher, ReviewPipeline, RunSummary, ScreenshotService};

use crate::activation;

/// Pull request actions that trigger a review run.
const REVIEW_ACTIONS: [&str; 3] = ["opened", "synchronize", "ready_for_review"];

/// Shared state for webhook handlers.
pub struct AppState {
    pub(crate) github: GithubClient,
    pub(crate) screenshots: Arc<dyn ScreenshotService>,
    pub(crate) fetcher: ContentFetcher,
    pub(crate) review: ReviewSettings,
    pub(crate) hosting: Option<HostingSettings>,
    pub(crate) http: reqwest::Client,
}

/// Build the webhook router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct WebhookAck {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    emitted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<usize>,
}

impl WebhookAck {
    const fn outcome(outcome: &'static str) -> Self {
        Self {
            outcome,
            emitted: None,
            skipped: None,
        }
    }

    const fn reviewed(summary: RunSummary) -> Self {
        Self {
            outcome: "reviewed",
            emitted: Some(summary.emitted),
            skipped: Some(summary.skipped),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    build: &'static str,
}

pub(crate) enum WebhookRejection {
    Malformed,
    RunFailed,
}

impl WebhookRejection {
    fn malformed(source: &serde_json::Error) -> Self {
        warn!(error = %source, "rejecting malformed webhook payload");
        Self::Malformed
    }

    fn run_failed(operation: &'static str, source: &dyn std::error::Error) -> Self {
        error!(operation, error = %source, "review run failed");
        Self::RunFailed
    }
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Malformed => (StatusCode::BAD_REQUEST, "malformed webhook payload"),
            Self::RunFailed => (StatusCode::INTERNAL_SERVER_ERROR, "review run failed"),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        build: vigil_telemetry::build_sha(),
    })
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, WebhookRejection> {
    let event_name = headers
        .get(HEADER_GITHUB_EVENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if event_name != "pull_request" {
        info!(event = event_name, "ignoring non pull_request delivery");
        return Ok(Json(WebhookAck::outcome("ignored")));
    }

    let event: PullRequestEvent =
        serde_json::from_slice(&body).map_err(|err| WebhookRejection::malformed(&err))?;

    if REVIEW_ACTIONS.contains(&event.action.as_str()) {
        return review_pull_request(&state, &event).await;
    }

    if event.action == "closed" && event.pull_request.merged {
        activation::activate_hosted_records(&state, &event).await;
        return Ok(Json(WebhookAck::outcome("activation")));
    }

    info!(action = %event.action, number = event.number, "ignoring pull request action");
    Ok(Json(WebhookAck::outcome("ignored")))
}

async fn review_pull_request(
    state: &Arc<AppState>,
    event: &PullRequestEvent,
) -> Result<Json<WebhookAck>, WebhookRejection> {
    // The veto list lives in this invocation only; concurrent deliveries
    // never observe each other's state.
    if vetoed_by_filter(&event.pull_request, &state.review) {
        info!(number = event.number, "review vetoed by label/title filter");
        return Ok(Json(WebhookAck::outcome("vetoed")));
    }

    let repo = event.repository.repo_ref();
    let files = state
        .github
        .list_changed_files(&repo, event.number)
        .await
        .map_err(|err| WebhookRejection::run_failed("pulls.list_files", &err))?;

    let emitter = Arc::new(IssueCommenter::new(state.github.clone(), repo));
    let pipeline = ReviewPipeline::new(
        state.fetcher.clone(),
        Arc::clone(&state.screenshots),
        emitter,
    );
    let summary = pipeline
        .run(&files, &event.pull_request.user.login, event.number)
        .await
        .map_err(|err| WebhookRejection::run_failed("pipeline.run", &err))?;

    Ok(Json(WebhookAck::reviewed(summary)))
}

fn vetoed_by_filter(pull_request: &PullRequestInfo, review: &ReviewSettings) -> bool {
    let marker = review.skip_title_marker.as_str();
    if !marker.is_empty() && pull_request.title.contains(marker) {
        return true;
    }
    pull_request.labels.iter().any(|label| {
        review
            .skip_labels
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(&label.name))
    })
}
