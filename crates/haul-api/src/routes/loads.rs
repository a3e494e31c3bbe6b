//! # Load Board Routes
//!
//! Load creation, posting lifecycle, assignment, and the
//! proof-of-delivery workflow.
//!
//! ## Endpoints
//!
//! - `POST /v1/loads` — create load (draft)
//! - `GET /v1/loads` — list loads
//! - `GET /v1/loads/{id}` — get load
//! - `POST /v1/loads/{id}/post` — publish to the board
//! - `POST /v1/loads/{id}/unpost` — withdraw from the board
//! - `POST /v1/loads/{id}/cancel` — cancel an unassigned load
//! - `POST /v1/loads/{id}/expire` — expire off the board
//! - `POST /v1/loads/{id}/assign` — assign a truck, creating the trip
//! - `POST /v1/loads/{id}/pod/submit` — carrier submits proof of delivery
//! - `POST /v1/loads/{id}/pod/verify` — shipper verifies the proof

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use haul_core::{LoadId, OrgId, Role, Timestamp, TruckId};
use haul_state::Load;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::trips::TripView;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create a new load.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoadRequest {
    /// Pickup location.
    pub origin: String,
    /// Drop-off location.
    pub destination: String,
    /// Owning shipper organization. Required for elevated callers;
    /// shipper tokens use their own organization binding.
    pub shipper_org: Option<Uuid>,
}

impl Validate for CreateLoadRequest {
    fn validate(&self) -> Result<(), String> {
        if self.origin.trim().is_empty() {
            return Err("origin must not be empty".to_string());
        }
        if self.destination.trim().is_empty() {
            return Err("destination must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to assign a truck to a posted load.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    /// The truck to assign.
    pub truck_id: Uuid,
}

impl Validate for AssignRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Load representation returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoadView {
    pub id: Uuid,
    pub shipper_org: Uuid,
    pub origin: String,
    pub destination: String,
    pub status: String,
    pub assigned_truck: Option<Uuid>,
    pub trip: Option<Uuid>,
    pub pod_submitted: bool,
    pub pod_verified: bool,
    pub pod_submitted_at: Option<String>,
    pub pod_verified_at: Option<String>,
    pub tracking_enabled: bool,
    pub settlement_status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Load> for LoadView {
    fn from(load: &Load) -> Self {
        Self {
            id: *load.id.as_uuid(),
            shipper_org: *load.shipper_org.as_uuid(),
            origin: load.origin.clone(),
            destination: load.destination.clone(),
            status: load.status.name().to_string(),
            assigned_truck: load.assigned_truck.map(|t| *t.as_uuid()),
            trip: load.trip.map(|t| *t.as_uuid()),
            pod_submitted: load.pod_submitted,
            pod_verified: load.pod_verified,
            pod_submitted_at: load.pod_submitted_at.map(|t| t.to_iso8601()),
            pod_verified_at: load.pod_verified_at.map(|t| t.to_iso8601()),
            tracking_enabled: load.tracking_enabled,
            settlement_status: load.settlement_status.name().to_string(),
            created_at: load.created_at.to_iso8601(),
            updated_at: load.updated_at.to_iso8601(),
        }
    }
}

/// Response to an assignment: the updated load and the new trip.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignResponse {
    pub load: LoadView,
    pub trip: TripView,
}

/// Resolve the shipper organization a load operation acts for.
///
/// Shipper tokens use their own binding; elevated callers name the
/// organization explicitly; carriers have no load-side capability.
fn owning_org(caller: &CallerIdentity, explicit: Option<Uuid>) -> Result<OrgId, AppError> {
    match caller.role {
        Role::Shipper => caller
            .org
            .ok_or_else(|| AppError::Forbidden("shipper token has no organization binding".into())),
        Role::Dispatcher | Role::Admin => explicit.map(OrgId::from).ok_or_else(|| {
            AppError::BadRequest("shipper_org is required for elevated callers".into())
        }),
        Role::Carrier => Err(AppError::Forbidden("carriers may not create loads".into())),
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the loads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/loads", get(list_loads).post(create_load))
        .route("/v1/loads/{id}", get(get_load))
        .route("/v1/loads/{id}/post", post(post_load))
        .route("/v1/loads/{id}/unpost", post(unpost_load))
        .route("/v1/loads/{id}/cancel", post(cancel_load))
        .route("/v1/loads/{id}/expire", post(expire_load))
        .route("/v1/loads/{id}/assign", post(assign_load))
        .route("/v1/loads/{id}/pod/submit", post(submit_pod))
        .route("/v1/loads/{id}/pod/verify", post(verify_pod))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/loads — Create a new load in DRAFT.
#[utoipa::path(
    post,
    path = "/v1/loads",
    request_body = CreateLoadRequest,
    responses(
        (status = 201, description = "Load created", body = LoadView),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn create_load(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateLoadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoadView>), AppError> {
    let req = extract_validated_json(body)?;
    let org = owning_org(&caller, req.shipper_org)?;
    let load = state
        .depot
        .create_load(org, req.origin, req.destination, Timestamp::now());
    Ok((StatusCode::CREATED, Json(LoadView::from(&load))))
}

/// GET /v1/loads — List all loads.
#[utoipa::path(
    get,
    path = "/v1/loads",
    responses(
        (status = 200, description = "List of loads", body = Vec<LoadView>),
    ),
    tag = "loads"
)]
async fn list_loads(State(state): State<AppState>) -> Json<Vec<LoadView>> {
    Json(state.depot.list_loads().iter().map(LoadView::from).collect())
}

/// GET /v1/loads/{id} — Get a single load.
#[utoipa::path(
    get,
    path = "/v1/loads/{id}",
    params(("id" = Uuid, Path, description = "Load ID")),
    responses(
        (status = 200, description = "Load found", body = LoadView),
        (status = 404, description = "Load not found", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn get_load(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadView>, AppError> {
    state
        .depot
        .get_load(&LoadId::from(id))
        .map(|load| Json(LoadView::from(&load)))
        .ok_or_else(|| AppError::NotFound(format!("load load:{id} not found")))
}

/// POST /v1/loads/{id}/post — Publish the load to the board.
#[utoipa::path(
    post,
    path = "/v1/loads/{id}/post",
    params(("id" = Uuid, Path, description = "Load ID")),
    responses(
        (status = 200, description = "Load posted", body = LoadView),
        (status = 400, description = "Transition rejected", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Load not found", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn post_load(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadView>, AppError> {
    let load = state
        .depot
        .post_load(&LoadId::from(id), &caller.principal(), Timestamp::now())?;
    Ok(Json(LoadView::from(&load)))
}

/// POST /v1/loads/{id}/unpost — Withdraw the load from the board.
#[utoipa::path(
    post,
    path = "/v1/loads/{id}/unpost",
    params(("id" = Uuid, Path, description = "Load ID")),
    responses(
        (status = 200, description = "Load withdrawn", body = LoadView),
        (status = 400, description = "Transition rejected", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn unpost_load(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadView>, AppError> {
    let load = state
        .depot
        .unpost_load(&LoadId::from(id), &caller.principal(), Timestamp::now())?;
    Ok(Json(LoadView::from(&load)))
}

/// POST /v1/loads/{id}/cancel — Cancel an unassigned load.
#[utoipa::path(
    post,
    path = "/v1/loads/{id}/cancel",
    params(("id" = Uuid, Path, description = "Load ID")),
    responses(
        (status = 200, description = "Load cancelled", body = LoadView),
        (status = 400, description = "Transition rejected", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn cancel_load(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadView>, AppError> {
    let load = state
        .depot
        .cancel_load(&LoadId::from(id), &caller.principal(), Timestamp::now())?;
    Ok(Json(LoadView::from(&load)))
}

/// POST /v1/loads/{id}/expire — Expire the load off the board.
#[utoipa::path(
    post,
    path = "/v1/loads/{id}/expire",
    params(("id" = Uuid, Path, description = "Load ID")),
    responses(
        (status = 200, description = "Load expired", body = LoadView),
        (status = 400, description = "Transition rejected", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn expire_load(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadView>, AppError> {
    let load = state
        .depot
        .expire_load(&LoadId::from(id), &caller.principal(), Timestamp::now())?;
    Ok(Json(LoadView::from(&load)))
}

/// POST /v1/loads/{id}/assign — Assign a truck, creating the trip.
#[utoipa::path(
    post,
    path = "/v1/loads/{id}/assign",
    params(("id" = Uuid, Path, description = "Load ID")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Truck assigned", body = AssignResponse),
        (status = 400, description = "Load not assignable", body = crate::error::ErrorBody),
        (status = 404, description = "Load or truck not found", body = crate::error::ErrorBody),
        (status = 409, description = "Truck not available", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn assign_load(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<AssignResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let (load, trip) = state.depot.assign_load(
        &LoadId::from(id),
        &TruckId::from(req.truck_id),
        &caller.principal(),
        Timestamp::now(),
    )?;
    Ok(Json(AssignResponse {
        load: LoadView::from(&load),
        trip: TripView::from(&trip),
    }))
}

/// POST /v1/loads/{id}/pod/submit — Carrier submits proof of delivery.
#[utoipa::path(
    post,
    path = "/v1/loads/{id}/pod/submit",
    params(("id" = Uuid, Path, description = "Load ID")),
    responses(
        (status = 200, description = "Proof recorded", body = LoadView),
        (status = 400, description = "Load not in DELIVERED", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn submit_pod(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadView>, AppError> {
    let load = state
        .depot
        .submit_pod(&LoadId::from(id), &caller.principal(), Timestamp::now())?;
    Ok(Json(LoadView::from(&load)))
}

/// POST /v1/loads/{id}/pod/verify — Shipper verifies the submitted proof.
#[utoipa::path(
    post,
    path = "/v1/loads/{id}/pod/verify",
    params(("id" = Uuid, Path, description = "Load ID")),
    responses(
        (status = 200, description = "Proof verified", body = LoadView),
        (status = 400, description = "Proof not submitted", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
    ),
    tag = "loads"
)]
async fn verify_pod(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadView>, AppError> {
    let load = state
        .depot
        .verify_pod(&LoadId::from(id), &caller.principal(), Timestamp::now())?;
    Ok(Json(LoadView::from(&load)))
}
