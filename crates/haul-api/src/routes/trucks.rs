//! # Truck Registry Routes
//!
//! ## Endpoints
//!
//! - `POST /v1/trucks` — register truck
//! - `GET /v1/trucks` — list trucks
//! - `GET /v1/trucks/{id}` — get truck

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use haul_core::{OrgId, Role, Timestamp, TruckId};
use haul_state::Truck;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a new truck.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTruckRequest {
    /// Registration plate.
    pub plate: String,
    /// Owning carrier organization. Required for elevated callers;
    /// carrier tokens use their own organization binding.
    pub carrier_org: Option<Uuid>,
}

impl Validate for CreateTruckRequest {
    fn validate(&self) -> Result<(), String> {
        if self.plate.trim().is_empty() {
            return Err("plate must not be empty".to_string());
        }
        Ok(())
    }
}

/// Truck representation returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TruckView {
    pub id: Uuid,
    pub carrier_org: Uuid,
    pub plate: String,
    pub is_available: bool,
    pub created_at: String,
}

impl From<&Truck> for TruckView {
    fn from(truck: &Truck) -> Self {
        Self {
            id: *truck.id.as_uuid(),
            carrier_org: *truck.carrier_org.as_uuid(),
            plate: truck.plate.clone(),
            is_available: truck.is_available,
            created_at: truck.created_at.to_iso8601(),
        }
    }
}

/// Resolve the carrier organization a truck registration acts for.
fn owning_org(caller: &CallerIdentity, explicit: Option<Uuid>) -> Result<OrgId, AppError> {
    match caller.role {
        Role::Carrier => caller
            .org
            .ok_or_else(|| AppError::Forbidden("carrier token has no organization binding".into())),
        Role::Dispatcher | Role::Admin => explicit.map(OrgId::from).ok_or_else(|| {
            AppError::BadRequest("carrier_org is required for elevated callers".into())
        }),
        Role::Shipper => Err(AppError::Forbidden("shippers may not register trucks".into())),
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the trucks router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/trucks", get(list_trucks).post(create_truck))
        .route("/v1/trucks/{id}", get(get_truck))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/trucks — Register a new truck.
#[utoipa::path(
    post,
    path = "/v1/trucks",
    request_body = CreateTruckRequest,
    responses(
        (status = 201, description = "Truck registered", body = TruckView),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "trucks"
)]
async fn create_truck(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateTruckRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TruckView>), AppError> {
    let req = extract_validated_json(body)?;
    let org = owning_org(&caller, req.carrier_org)?;
    let truck = state.depot.create_truck(org, req.plate, Timestamp::now());
    Ok((StatusCode::CREATED, Json(TruckView::from(&truck))))
}

/// GET /v1/trucks — List all trucks.
#[utoipa::path(
    get,
    path = "/v1/trucks",
    responses(
        (status = 200, description = "List of trucks", body = Vec<TruckView>),
    ),
    tag = "trucks"
)]
async fn list_trucks(State(state): State<AppState>) -> Json<Vec<TruckView>> {
    Json(state.depot.list_trucks().iter().map(TruckView::from).collect())
}

/// GET /v1/trucks/{id} — Get a single truck.
#[utoipa::path(
    get,
    path = "/v1/trucks/{id}",
    params(("id" = Uuid, Path, description = "Truck ID")),
    responses(
        (status = 200, description = "Truck found", body = TruckView),
        (status = 404, description = "Truck not found", body = crate::error::ErrorBody),
    ),
    tag = "trucks"
)]
async fn get_truck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TruckView>, AppError> {
    state
        .depot
        .get_truck(&TruckId::from(id))
        .map(|truck| Json(TruckView::from(&truck)))
        .ok_or_else(|| AppError::NotFound(format!("truck truck:{id} not found")))
}
