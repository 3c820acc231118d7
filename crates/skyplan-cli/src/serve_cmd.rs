use std::convert::Infallible;
use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use skyplan_core::fields::{PlanPayload, ProgramPayload};
use skyplan_core::role::parse_claim;
use skyplan_core::{Role, WorkflowError, service};
use skyplan_db::models::PlanStatus;

/// Request header carrying the caller's role claim.
pub const ROLE_HEADER: &str = "x-skyplan-role";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    violations: Vec<String>,
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let status = match &err {
            WorkflowError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::Guard { .. } => StatusCode::CONFLICT,
            WorkflowError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            WorkflowError::Store(e) => {
                tracing::error!(error = %format!("{e:#}"), "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: format!("{err:#}"),
            violations: err.violations().iter().map(ToString::to_string).collect(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "violations": self.violations,
        });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Role claim extractor
// ---------------------------------------------------------------------------

/// The role claimed by the `x-skyplan-role` header. Missing, non-UTF-8 and
/// unrecognised values all yield `None`.
pub struct Claim(pub Option<Role>);

impl<S: Send + Sync> FromRequestParts<S> for Claim {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok());
        Ok(Self(parse_claim(raw)))
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    pub status: Option<PlanStatus>,
}

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub plan_id: Uuid,
    pub messages: Vec<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/star-systems", get(list_star_systems))
        .route("/api/plans", get(list_plans).post(create_plan))
        .route(
            "/api/plans/{id}",
            get(get_plan_detail).put(edit_plan).delete(delete_plan),
        )
        .route("/api/plans/{id}/simulate", post(simulate_plan))
        .route("/api/plans/{id}/validate", post(validate_plan))
        .route("/api/plans/{id}/submit", post(submit_program))
        .route("/api/programs", get(list_programs))
        .route("/api/programs/{id}", get(get_program))
        .route("/api/programs/{id}/execute", post(execute_program))
        .layer(CorsLayer::permissive())
        .with_state(pool)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pool: PgPool, bind: &str, port: u16) -> Result<()> {
    let app = build_router(pool);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("skyplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("skyplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_star_systems(
    State(pool): State<PgPool>,
    Claim(role): Claim,
) -> Result<Response, AppError> {
    let systems = service::list_star_systems(&pool, role).await?;
    Ok(Json(systems).into_response())
}

async fn list_plans(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Query(query): Query<ListPlansQuery>,
) -> Result<Response, AppError> {
    let plans = service::list_plans(&pool, role, query.status).await?;
    Ok(Json(plans).into_response())
}

async fn create_plan(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Json(payload): Json<PlanPayload>,
) -> Result<Response, AppError> {
    let plan = service::create_plan(&pool, role, &payload).await?;
    Ok((StatusCode::CREATED, Json(plan)).into_response())
}

async fn get_plan_detail(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let detail = service::plan_detail(&pool, role, id).await?;
    Ok(Json(detail).into_response())
}

async fn edit_plan(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlanPayload>,
) -> Result<Response, AppError> {
    let plan = service::edit_plan(&pool, role, id, &payload).await?;
    Ok(Json(plan).into_response())
}

async fn delete_plan(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let deleted = service::delete_plan(&pool, role, id).await?;
    Ok(Json(deleted).into_response())
}

async fn simulate_plan(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let messages = service::simulate_plan(&pool, role, id).await?;
    Ok(Json(SimulationResponse {
        plan_id: id,
        messages,
    })
    .into_response())
}

async fn validate_plan(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let validated = service::validate_plan(&pool, role, id).await?;
    Ok(Json(validated).into_response())
}

async fn submit_program(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgramPayload>,
) -> Result<Response, AppError> {
    let program = service::submit_program(&pool, role, id, &payload).await?;
    Ok((StatusCode::CREATED, Json(program)).into_response())
}

async fn list_programs(
    State(pool): State<PgPool>,
    Claim(role): Claim,
) -> Result<Response, AppError> {
    let programs = service::list_programs(&pool, role).await?;
    Ok(Json(programs).into_response())
}

async fn get_program(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let program = service::get_program(&pool, role, id).await?;
    Ok(Json(program).into_response())
}

async fn execute_program(
    State(pool): State<PgPool>,
    Claim(role): Claim,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let program = service::execute_program(&pool, role, id).await?;
    Ok(Json(program).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
