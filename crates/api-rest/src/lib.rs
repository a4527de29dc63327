//! # API REST
//!
//! REST API implementation for the CDSS medication plan service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! Uses `api-shared` for wire types and `cdss-core` for everything else.

#![warn(rust_2018_idioms)]

mod convert;
mod error;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AddPlanReq, AddPlanRes, HealthRes, HealthService, InteractionRes, MedicationRes,
    PatientSummaryRes, PlanRes, PopulatedPlanRes,
};
use cdss_core::{AddPlanInput, PlanService};

pub use error::ApiError;

/// Banner returned by `GET /`.
pub const ROOT_BANNER: &str = "TCM Clinical Decision Support System Backend is running!";

/// Message returned with a successfully created plan.
pub const PLAN_ADDED_MESSAGE: &str = "Medication plan added successfully!";

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    plan_service: PlanService,
}

impl AppState {
    pub fn new(plan_service: PlanService) -> Self {
        Self { plan_service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(root, health, list_plans, add_plan),
    components(schemas(
        HealthRes,
        AddPlanReq,
        AddPlanRes,
        PlanRes,
        InteractionRes,
        PatientSummaryRes,
        MedicationRes,
        PopulatedPlanRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router: API routes, Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/medications", get(list_plans))
        .route("/api/medications/add", post(add_plan))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = String)
    )
)]
async fn root() -> &'static str {
    ROOT_BANNER
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/medications",
    responses(
        (status = 200, description = "All medication plans, populated", body = [PopulatedPlanRes]),
        (status = 400, description = "Persistence error", body = String)
    )
)]
/// List every medication plan with its patient name and full medication record.
///
/// # Errors
/// Returns `400 Bad Request` with an `"Error: ..."` string if the store cannot be read.
#[axum::debug_handler]
async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopulatedPlanRes>>, ApiError> {
    let service = state.plan_service.clone();
    let plans = tokio::task::spawn_blocking(move || service.list_plans()).await??;

    Ok(Json(
        plans.into_iter().map(convert::populated_plan).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/medications/add",
    request_body = AddPlanReq,
    responses(
        (status = 200, description = "Plan created", body = AddPlanRes),
        (status = 400, description = "Missing fields, unknown type or persistence error", body = String),
        (status = 409, description = "Interaction detected, plan not created", body = InteractionRes)
    )
)]
/// Add a medication plan for a patient.
///
/// Creates the patient and the medication on first use, then runs the interaction check. A
/// detected interaction refuses the plan with `409 Conflict`.
///
/// # Errors
/// - `400 Bad Request` if a required field is missing, the type is unknown, the body is not
///   valid JSON, or the store fails.
/// - `409 Conflict` with `{message, error}` if an interaction is detected.
#[axum::debug_handler]
async fn add_plan(
    State(state): State<AppState>,
    payload: Result<Json<AddPlanReq>, JsonRejection>,
) -> Result<Json<AddPlanRes>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let input = AddPlanInput {
        patient_id: req.patient_id,
        medication_name: req.medication_name,
        dosage: req.dosage,
        medication_type: req.medication_type,
        ingredients: req.ingredients,
        schedule: req.schedule,
    };

    let service = state.plan_service.clone();
    let plan = tokio::task::spawn_blocking(move || service.add_plan(input)).await??;

    Ok(Json(AddPlanRes {
        message: PLAN_ADDED_MESSAGE.into(),
        plan: convert::plan(plan),
    }))
}
