use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use server_api::{create_job, delete_job, get_job, list_jobs, update_job, ApiContext};
use shared::{
    domain::{JobId, JobPosting},
    error::{ApiError, ErrorCode},
    protocol::{CreateJobRequest, DeleteJobResponse, ListJobsQuery, UpdateJobRequest, JOBS_ROUTE},
};
use storage::Storage;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, %database_url, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(JOBS_ROUTE, get(http_list_jobs).post(http_create_job))
        .route(
            &format!("{JOBS_ROUTE}/:job_id"),
            get(http_get_job)
                .patch(http_update_job)
                .put(http_update_job)
                .delete(http_delete_job),
        )
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            warn!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
        }
    }
}

async fn http_list_jobs(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListJobsQuery>,
) -> ApiResult<Json<Vec<JobPosting>>> {
    let filter = q.into_filter();
    let jobs = list_jobs(&state.api, &filter).await.map_err(api_failure)?;
    Ok(Json(jobs))
}

async fn http_get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<JobPosting>> {
    let job = get_job(&state.api, JobId(job_id)).await.map_err(api_failure)?;
    Ok(Json(job))
}

async fn http_create_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<JobPosting>)> {
    let job = create_job(&state.api, req).await.map_err(api_failure)?;
    Ok((StatusCode::CREATED, Json(job)))
}

async fn http_update_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
    Json(req): Json<UpdateJobRequest>,
) -> ApiResult<Json<JobPosting>> {
    let job = update_job(&state.api, JobId(job_id), req)
        .await
        .map_err(api_failure)?;
    Ok(Json(job))
}

async fn http_delete_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<DeleteJobResponse>> {
    delete_job(&state.api, JobId(job_id))
        .await
        .map_err(api_failure)?;
    Ok(Json(DeleteJobResponse {
        message: "Job deleted".to_string(),
    }))
}

fn api_failure(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
