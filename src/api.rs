//! HTTP surface for Paper Digest.
//!
//! A small Axum router with three endpoints:
//!
//! - `POST /digest` – Run one digest pass: query the catalog for the most recent
//!   papers, fetch and summarize each one, and rewrite the digest file. Returns the
//!   records produced together with `requested`/`fetched`/`recorded`/`skipped` counters;
//!   an empty `records` array with `recorded: 0` signals that the run found nothing.
//! - `GET /metrics` – Observe run counters for recorded and skipped papers.
//! - `GET /commands` – Machine-readable catalog of the commands above, for hosts
//!   that discover capabilities at runtime.
//!
//! The HTTP surface drives the same pipeline as the `digest-run` CLI, so both
//! interfaces behave the same.

use crate::pipeline::{DigestApi, DigestRecord, PipelineError};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const DEFAULT_DIGEST_COUNT: usize = 5;

/// Build the HTTP router exposing the digest API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DigestApi + 'static,
{
    Router::new()
        .route("/digest", post(run_digest::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /digest` endpoint.
#[derive(Deserialize)]
struct DigestRequest {
    /// Number of recent papers to request from the catalog (defaults to 5).
    #[serde(default)]
    max_results: Option<usize>,
}

/// Success response for the `POST /digest` endpoint.
#[derive(Serialize)]
struct DigestResponse {
    /// Count requested from the catalog.
    requested: usize,
    /// Papers the catalog returned.
    fetched: usize,
    /// Papers written to the digest file.
    recorded: usize,
    /// Papers dropped because a per-paper stage failed.
    skipped: usize,
    /// Digest records in file order.
    records: Vec<DigestRecord>,
}

/// Run one digest pass over the most recent catalog papers.
///
/// The count is validated against the configured maximum; out-of-bounds
/// requests fail with `400` before any catalog traffic happens.
async fn run_digest<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<DigestRequest>,
) -> Result<Json<DigestResponse>, AppError>
where
    S: DigestApi,
{
    let requested = request.max_results.unwrap_or(DEFAULT_DIGEST_COUNT);
    let outcome = service.run_digest(requested).await?;
    tracing::info!(
        requested,
        fetched = outcome.fetched,
        recorded = outcome.records.len(),
        skipped = outcome.skipped,
        "Digest request completed"
    );
    Ok(Json(DigestResponse {
        requested,
        fetched: outcome.fetched,
        recorded: outcome.records.len(),
        skipped: outcome.skipped,
        records: outcome.records,
    }))
}

/// Return a concise metrics snapshot with run and paper counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Result<Json<MetricsResponse>, AppError>
where
    S: DigestApi,
{
    let snapshot = service.metrics_snapshot();
    Ok(Json(MetricsResponse {
        runs_completed: snapshot.runs_completed,
        papers_recorded: snapshot.papers_recorded,
        papers_skipped: snapshot.papers_skipped,
    }))
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    runs_completed: u64,
    papers_recorded: u64,
    papers_skipped: u64,
}

/// One entry in the command discovery listing.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// List the supported HTTP commands so hosts can discover them at runtime.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "digest",
                method: "POST",
                path: "/digest",
                description: "Summarize the most recent catalog papers into the digest file. Response returns { \"recorded\": number, \"skipped\": number, \"records\": [...] }.",
                request_example: Some(json!({
                    "max_results": 5
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return digest run counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

struct AppError(PipelineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::InvalidCount { .. } => StatusCode::BAD_REQUEST,
            PipelineError::Catalog(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::catalog::CatalogError;
    use crate::metrics::MetricsSnapshot;
    use crate::pipeline::{Category, DigestApi, DigestOutcome, DigestRecord, PipelineError};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_digest_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let digest = commands
            .iter()
            .find(|cmd| cmd.name == "digest")
            .expect("digest command present");

        assert_eq!(digest.method, "POST");
        assert_eq!(digest.path, "/digest");
        assert!(digest.description.to_lowercase().contains("summarize"));
        assert!(commands.len() >= 2);
    }

    #[tokio::test]
    async fn digest_route_returns_records_and_counters() {
        let outcome = DigestOutcome {
            records: vec![DigestRecord {
                title: "Vision Survey".into(),
                category: Category::RobotVision,
                summary: "Cameras everywhere.".into(),
            }],
            fetched: 2,
            skipped: 1,
        };
        let service = Arc::new(StubDigestService::succeeding(outcome));
        let app = create_router(service.clone());

        let response = app
            .oneshot(digest_request(json!({ "max_results": 2 })))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["requested"], 2);
        assert_eq!(json["fetched"], 2);
        assert_eq!(json["recorded"], 1);
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["records"][0]["title"], "Vision Survey");
        assert_eq!(json["records"][0]["category"], "Robot Vision");
        assert_eq!(json["records"][0]["summary"], "Cameras everywhere.");

        assert_eq!(service.recorded_calls().await, vec![2]);
    }

    #[tokio::test]
    async fn digest_route_defaults_the_count() {
        let service = Arc::new(StubDigestService::succeeding(DigestOutcome {
            records: Vec::new(),
            fetched: 0,
            skipped: 0,
        }));
        let app = create_router(service.clone());

        let response = app
            .oneshot(digest_request(json!({})))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(service.recorded_calls().await, vec![5]);
    }

    #[tokio::test]
    async fn invalid_count_maps_to_bad_request() {
        let service = Arc::new(StubDigestService::failing(StubFailure::InvalidCount));
        let app = create_router(service);

        let response = app
            .oneshot(digest_request(json!({ "max_results": 0 })))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let message = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(message.contains("outside"));
    }

    #[tokio::test]
    async fn catalog_failure_maps_to_bad_gateway() {
        let service = Arc::new(StubDigestService::failing(StubFailure::CatalogDown));
        let app = create_router(service);

        let response = app
            .oneshot(digest_request(json!({ "max_results": 3 })))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn metrics_route_reports_counters() {
        let service = Arc::new(StubDigestService::succeeding(DigestOutcome {
            records: Vec::new(),
            fetched: 0,
            skipped: 0,
        }));
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["runs_completed"], 3);
        assert_eq!(json["papers_recorded"], 9);
        assert_eq!(json["papers_skipped"], 2);
    }

    fn digest_request(payload: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/digest")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    enum StubFailure {
        InvalidCount,
        CatalogDown,
    }

    struct StubDigestService {
        calls: Arc<Mutex<Vec<usize>>>,
        outcome: Option<DigestOutcome>,
        failure: Option<StubFailure>,
    }

    impl StubDigestService {
        fn succeeding(outcome: DigestOutcome) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                outcome: Some(outcome),
                failure: None,
            }
        }

        fn failing(failure: StubFailure) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                outcome: None,
                failure: Some(failure),
            }
        }

        async fn recorded_calls(&self) -> Vec<usize> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl DigestApi for StubDigestService {
        async fn run_digest(&self, requested: usize) -> Result<DigestOutcome, PipelineError> {
            self.calls.lock().await.push(requested);
            match &self.failure {
                Some(StubFailure::InvalidCount) => {
                    Err(PipelineError::InvalidCount { requested, max: 100 })
                }
                Some(StubFailure::CatalogDown) => {
                    Err(PipelineError::Catalog(CatalogError::UnexpectedStatus {
                        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                        body: "catalog overloaded".into(),
                    }))
                }
                None => Ok(self.outcome.clone().expect("stub outcome")),
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                runs_completed: 3,
                papers_recorded: 9,
                papers_skipped: 2,
            }
        }
    }
}
