//! # Trip Routes
//!
//! Trip queries, the status transition operation, and the per-trip
//! transition event log.
//!
//! ## Endpoints
//!
//! - `GET /v1/trips` — list trips
//! - `GET /v1/trips/{id}` — get trip
//! - `POST /v1/trips/{id}/transition` — request a status transition
//! - `GET /v1/trips/{id}/events` — transition event log

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use haul_core::{Timestamp, TripId};
use haul_state::{TransitionEvent, Trip, TripStatus};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::loads::LoadView;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to transition a trip to a new status.
///
/// `target` takes the canonical status names (`PICKUP_PENDING`,
/// `IN_TRANSIT`, ...). An unrecognized name fails deserialization and is
/// answered with 400. `expected_status` is the optimistic-concurrency
/// check: when present and no longer matching the committed status, the
/// request is answered with 409 and nothing is mutated.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// The requested target status.
    #[schema(value_type = String, example = "PICKUP_PENDING")]
    pub target: TripStatus,
    /// The status the caller last observed, if it wants the race check.
    #[schema(value_type = Option<String>)]
    pub expected_status: Option<TripStatus>,
}

/// Trip representation returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TripView {
    pub id: Uuid,
    pub load: Uuid,
    pub truck: Uuid,
    pub carrier_org: Uuid,
    pub shipper_org: Uuid,
    pub status: String,
    pub created_at: String,
    pub started_at: Option<String>,
    pub picked_up_at: Option<String>,
    pub delivered_at: Option<String>,
    pub completed_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancelled_by: Option<Uuid>,
}

impl From<&Trip> for TripView {
    fn from(trip: &Trip) -> Self {
        Self {
            id: *trip.id.as_uuid(),
            load: *trip.load.as_uuid(),
            truck: *trip.truck.as_uuid(),
            carrier_org: *trip.carrier_org.as_uuid(),
            shipper_org: *trip.shipper_org.as_uuid(),
            status: trip.status.name().to_string(),
            created_at: trip.created_at.to_iso8601(),
            started_at: trip.started_at.map(|t| t.to_iso8601()),
            picked_up_at: trip.picked_up_at.map(|t| t.to_iso8601()),
            delivered_at: trip.delivered_at.map(|t| t.to_iso8601()),
            completed_at: trip.completed_at.map(|t| t.to_iso8601()),
            cancelled_at: trip.cancelled_at.map(|t| t.to_iso8601()),
            cancelled_by: trip.cancelled_by.map(|p| *p.as_uuid()),
        }
    }
}

/// Response to an accepted transition: the trip and its mirrored load.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransitionResponse {
    pub trip: TripView,
    pub load: LoadView,
}

/// Transition event representation returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventView {
    pub load: Uuid,
    pub trip: Option<Uuid>,
    pub from: String,
    pub to: String,
    pub actor: Uuid,
    pub timestamp: String,
    pub note: Option<String>,
}

impl From<&TransitionEvent> for EventView {
    fn from(event: &TransitionEvent) -> Self {
        Self {
            load: *event.load.as_uuid(),
            trip: event.trip.map(|t| *t.as_uuid()),
            from: event.from.clone(),
            to: event.to.clone(),
            actor: *event.actor.as_uuid(),
            timestamp: event.timestamp.to_iso8601(),
            note: event.note.clone(),
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the trips router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/trips", get(list_trips))
        .route("/v1/trips/{id}", get(get_trip))
        .route("/v1/trips/{id}/transition", post(transition_trip))
        .route("/v1/trips/{id}/events", get(trip_events))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/trips — List all trips.
#[utoipa::path(
    get,
    path = "/v1/trips",
    responses(
        (status = 200, description = "List of trips", body = Vec<TripView>),
    ),
    tag = "trips"
)]
async fn list_trips(State(state): State<AppState>) -> Json<Vec<TripView>> {
    Json(state.depot.list_trips().iter().map(TripView::from).collect())
}

/// GET /v1/trips/{id} — Get a single trip.
#[utoipa::path(
    get,
    path = "/v1/trips/{id}",
    params(("id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip found", body = TripView),
        (status = 404, description = "Trip not found", body = crate::error::ErrorBody),
    ),
    tag = "trips"
)]
async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripView>, AppError> {
    state
        .depot
        .get_trip(&TripId::from(id))
        .map(|trip| Json(TripView::from(&trip)))
        .ok_or_else(|| AppError::NotFound(format!("trip trip:{id} not found")))
}

/// POST /v1/trips/{id}/transition — Request a trip status transition.
///
/// The transition is validated against the lifecycle table, the
/// proof-of-delivery gate, and the caller's capability, then applied with
/// its full side-effect set as one atomic unit.
#[utoipa::path(
    post,
    path = "/v1/trips/{id}/transition",
    params(("id" = Uuid, Path, description = "Trip ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = TransitionResponse),
        (status = 400, description = "Transition rejected", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Trip not found", body = crate::error::ErrorBody),
        (status = 409, description = "Status changed since observed", body = crate::error::ErrorBody),
    ),
    tag = "trips"
)]
async fn transition_trip(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<TransitionResponse>, AppError> {
    let req = extract_json(body)?;
    let (trip, load) = state.depot.transition_trip(
        &TripId::from(id),
        req.target,
        req.expected_status,
        &caller.principal(),
        Timestamp::now(),
    )?;
    Ok(Json(TransitionResponse {
        trip: TripView::from(&trip),
        load: LoadView::from(&load),
    }))
}

/// GET /v1/trips/{id}/events — Transition event log for one trip.
#[utoipa::path(
    get,
    path = "/v1/trips/{id}/events",
    params(("id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Events, oldest first", body = Vec<EventView>),
        (status = 404, description = "Trip not found", body = crate::error::ErrorBody),
    ),
    tag = "trips"
)]
async fn trip_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EventView>>, AppError> {
    state
        .depot
        .events_for_trip(&TripId::from(id))
        .map(|events| Json(events.iter().map(EventView::from).collect()))
        .ok_or_else(|| AppError::NotFound(format!("trip trip:{id} not found")))
}
