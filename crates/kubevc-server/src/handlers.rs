//! Route handlers
//!
//! `/webhook` acknowledges every delivery with 200: detector, renderer and
//! storage failures are reported in the body so senders never retry into
//! a loop.
//!
//! The pipeline runs on its own task. A sender that hangs up mid-render
//! drops only the response, never the render or the store writes.

use crate::html;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use kubevc_core::errors::ExErrorKind;
use kubevc_core::{detect, SnapshotIdentity, WebhookPayload};
use kubevc_core_types::RequestContext;
use kubevc_engine::{PipelineOutcome, PipelineResult};
use kubevc_store::content_type_for;
use serde::Serialize;
use serde_json::json;
use tracing::Instrument;

pub const DELIVERY_HEADER: &str = "x-github-delivery";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub const MSG_NO_CHANGE: &str = "no YAML changes detected";
pub const MSG_STORED: &str = "YAML change detected; diagram updated + uploaded to S3";

/// JSON body returned by `POST /webhook`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    pub outcome: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_yaml: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_url: Option<String>,
    pub repository: String,
    pub commit_id: String,
}

impl From<PipelineResult> for WebhookResponse {
    fn from(result: PipelineResult) -> Self {
        let changed_yaml = (!result.changes.is_empty()).then(|| result.changes.to_vec());
        let (message, diagram_url) = match &result.outcome {
            PipelineOutcome::NoChange => (MSG_NO_CHANGE.to_string(), None),
            PipelineOutcome::Stored(stored) => (MSG_STORED.to_string(), Some(stored.locator.clone())),
            PipelineOutcome::RenderFailed { reason } => (
                format!("YAML change detected; diagram rendering failed: {}", reason),
                None,
            ),
            PipelineOutcome::StorageFailed { reason } => (
                format!("YAML change detected; snapshot upload failed: {}", reason),
                None,
            ),
            PipelineOutcome::Aborted { reason } => (
                format!("YAML change detected; snapshot run aborted: {}", reason),
                None,
            ),
        };
        Self {
            ok: result.outcome.is_success(),
            outcome: result.outcome.name(),
            message,
            changed_yaml,
            diagram_url,
            repository: result.identity.repository,
            commit_id: result.identity.commit_id,
        }
    }
}

pub async fn home() -> Html<String> {
    Html(html::home_page())
}

pub async fn webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let mut ctx = RequestContext::new();
    if let Some(delivery) = headers.get(DELIVERY_HEADER).and_then(|v| v.to_str().ok()) {
        ctx = ctx.with_delivery_id(delivery);
    }
    let span = tracing::info_span!(
        "webhook",
        request_id = %ctx.request_id,
        delivery_id = ctx.delivery_id.as_deref().unwrap_or(""),
    );

    async move {
        let payload = WebhookPayload::from_slice(&body);
        let detected = detect(&payload);
        state.last_seen.record(detected.event.commit_id.as_deref());
        tracing::info!(
            repository = %detected.event.repository,
            changed_paths = detected.event.changed_paths.len(),
            manifests = detected.manifests.len(),
            "webhook received"
        );

        let pipeline = state.pipeline.clone();
        let run = {
            let (ctx, event, manifests) =
                (ctx.clone(), detected.event.clone(), detected.manifests.clone());
            tokio::spawn(
                async move { pipeline.process(&ctx, &event, &manifests).await }
                    .in_current_span(),
            )
        };
        let result = match run.await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err, "snapshot pipeline task failed");
                PipelineResult {
                    identity: SnapshotIdentity::resolve(&detected.event, &ctx.request_id),
                    changes: detected.manifests,
                    outcome: PipelineOutcome::Aborted {
                        reason: err.to_string(),
                    },
                }
            }
        };
        tracing::info!(outcome = result.outcome.name(), "webhook handled");

        let mut response = Json(WebhookResponse::from(result)).into_response();
        if let Ok(value) = HeaderValue::from_str(ctx.request_id.as_str()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

pub async fn dashboard(State(state): State<AppState>) -> Response {
    match state.reconstructor.list_snapshots().await {
        Ok(entries) => Html(html::dashboard_page(&entries)).into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(html::unavailable_page(&err.to_string())),
        )
            .into_response(),
    }
}

pub async fn api_snapshots(State(state): State<AppState>) -> Response {
    match state.reconstructor.list_snapshots().await {
        Ok(entries) => Json(json!({ "snapshots": entries })).into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": { "code": err.code(), "message": err.message() } })),
        )
            .into_response(),
    }
}

pub async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "backend": state.store.backend(),
        "last_seen": state.last_seen.snapshot(),
    }))
}

pub async fn artifact(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.store.get(&key).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&key))],
            bytes,
        )
            .into_response(),
        Err(err) if matches!(err.kind(), ExErrorKind::NotFound | ExErrorKind::InvalidInput) => {
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
        Err(err) => {
            tracing::warn!(key = %key, err.code = err.code(), error = %err, "artifact read failed");
            (StatusCode::BAD_GATEWAY, "snapshot store unavailable").into_response()
        }
    }
}
