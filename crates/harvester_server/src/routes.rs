use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use engine_logging::{engine_debug, engine_info};
use harvester_core::{JobId, JobSnapshot};
use harvester_engine::{EngineError, JobEngine};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedJob {
    #[serde(rename = "jobId")]
    pub job_id: JobId,
}

/// Build the HTTP surface around a shared engine.
///
/// Only `POST /scrape` and `GET /status` are routed; anything else is a plain
/// 404. `OPTIONS` is answered on every path, and every response carries the
/// permissive CORS headers.
pub fn router(engine: JobEngine) -> Router {
    Router::new()
        .route("/scrape", post(scrape).fallback(not_found))
        .route("/status", get(status).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn(cors))
        .with_state(engine)
}

/// POST /scrape - submit a batch of URLs, returns the new job id.
async fn scrape(
    State(engine): State<JobEngine>,
    body: Bytes,
) -> Result<Json<CreatedJob>, ApiError> {
    let body: Value = serde_json::from_slice(&body).map_err(ApiError::InvalidJson)?;
    let job_id = engine.create(&body)?;
    engine_info!("Accepted job {}", job_id);
    Ok(Json(CreatedJob { job_id }))
}

/// GET /status?jobId=... - current, possibly partial, state of a job.
///
/// Only the first `jobId` pair counts; repeats and unrelated params are ignored.
async fn status(
    State(engine): State<JobEngine>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<JobSnapshot>, ApiError> {
    let job_id = params
        .into_iter()
        .find_map(|(key, value)| (key == "jobId").then_some(value))
        .ok_or_else(|| EngineError::NotFound(String::new()))?;
    Ok(Json(engine.status(&job_id)?))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

async fn cors(request: Request, next: Next) -> Response {
    engine_debug!("{} {}", request.method(), request.uri().path());
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
