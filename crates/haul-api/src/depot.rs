//! # Depot — Records and the Side-Effect Orchestrator
//!
//! Thread-safe, cloneable store for loads, trips, trucks, and the
//! transition event log, plus the orchestration logic that applies an
//! accepted transition's full mutation set as one atomic unit.
//!
//! ## Atomicity
//!
//! One `parking_lot::RwLock` guards the whole record set. Every mutating
//! operation takes the write lock once and applies all of its effects —
//! trip status + milestone timestamp, load mirror, truck availability,
//! event append — before releasing it. There is no window where a trip is
//! terminal but its truck is still marked busy.
//!
//! The same lock serializes racing transition requests on one trip: the
//! second request re-validates against the first one's committed status
//! and is rejected by the lifecycle rules. Callers that captured the
//! status before submitting can pass it as `expected`; a mismatch is
//! answered with a conflict and nothing is mutated, so the caller can
//! re-fetch and resubmit.
//!
//! All operations are synchronous (the RwLock is `parking_lot`, not
//! `tokio::sync`) because the lock is never held across `.await` points.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use haul_core::{LoadId, OrgId, Principal, Timestamp, TripId, TruckId};
use haul_state::{
    may_manage_load, may_submit_pod, may_transition_trip, may_verify_pod, Load, LoadError,
    TransitionEvent, Trip, TripStatus, Truck,
};

use crate::error::AppError;

/// All platform records behind a single writer-exclusive lock.
#[derive(Debug, Default)]
struct DepotInner {
    loads: HashMap<LoadId, Load>,
    trips: HashMap<TripId, Trip>,
    trucks: HashMap<TruckId, Truck>,
    events: Vec<TransitionEvent>,
}

/// Cloneable handle to the shared record set.
#[derive(Debug, Clone, Default)]
pub struct Depot {
    inner: Arc<RwLock<DepotInner>>,
}

impl Depot {
    /// Create an empty depot.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Loads ───────────────────────────────────────────────────────

    /// Create a load in `Draft` for the given shipper organization.
    pub fn create_load(
        &self,
        shipper_org: OrgId,
        origin: String,
        destination: String,
        now: Timestamp,
    ) -> Load {
        let load = Load::new(LoadId::new(), shipper_org, origin, destination, now);
        self.inner.write().loads.insert(load.id, load.clone());
        load
    }

    /// Retrieve a load by id.
    pub fn get_load(&self, id: &LoadId) -> Option<Load> {
        self.inner.read().loads.get(id).cloned()
    }

    /// List all loads.
    pub fn list_loads(&self) -> Vec<Load> {
        self.inner.read().loads.values().cloned().collect()
    }

    /// Post the load to the board.
    pub fn post_load(
        &self,
        id: &LoadId,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<Load, AppError> {
        self.load_op(id, principal, now, |load, now| load.post(now))
    }

    /// Withdraw the load from the board.
    pub fn unpost_load(
        &self,
        id: &LoadId,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<Load, AppError> {
        self.load_op(id, principal, now, |load, now| load.unpost(now))
    }

    /// Cancel an unassigned load.
    pub fn cancel_load(
        &self,
        id: &LoadId,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<Load, AppError> {
        self.load_op(id, principal, now, |load, now| load.cancel(now))
    }

    /// Expire the load off the board.
    pub fn expire_load(
        &self,
        id: &LoadId,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<Load, AppError> {
        self.load_op(id, principal, now, |load, now| load.expire(now))
    }

    /// Apply a pre-assignment load-machine operation: ownership gate,
    /// mutation, and event append under one write lock.
    fn load_op(
        &self,
        id: &LoadId,
        principal: &Principal,
        now: Timestamp,
        op: impl FnOnce(&mut Load, Timestamp) -> Result<(), LoadError>,
    ) -> Result<Load, AppError> {
        let mut inner = self.inner.write();
        let load = inner
            .loads
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("load {id} not found")))?;

        if !may_manage_load(principal, &load.shipper_org) {
            return Err(AppError::Forbidden(format!(
                "principal may not manage loads of {}",
                load.shipper_org
            )));
        }

        let from = load.status;
        op(load, now)?;
        let snapshot = load.clone();

        inner.events.push(TransitionEvent::for_load(
            snapshot.id,
            from,
            snapshot.status,
            principal.id,
            now,
        ));
        Ok(snapshot)
    }

    // ── Trucks ──────────────────────────────────────────────────────

    /// Register a truck for the given carrier organization.
    pub fn create_truck(&self, carrier_org: OrgId, plate: String, now: Timestamp) -> Truck {
        let truck = Truck::new(TruckId::new(), carrier_org, plate, now);
        self.inner.write().trucks.insert(truck.id, truck.clone());
        truck
    }

    /// Retrieve a truck by id.
    pub fn get_truck(&self, id: &TruckId) -> Option<Truck> {
        self.inner.read().trucks.get(id).cloned()
    }

    /// List all trucks.
    pub fn list_trucks(&self) -> Vec<Truck> {
        self.inner.read().trucks.values().cloned().collect()
    }

    // ── Assignment ──────────────────────────────────────────────────

    /// Assign a posted load to an available truck, creating the trip.
    ///
    /// One atomic unit: load moves to `Assigned` with truck/trip pointers
    /// set, the trip record is created, the truck goes unavailable, and
    /// the assignment event is appended.
    pub fn assign_load(
        &self,
        load_id: &LoadId,
        truck_id: &TruckId,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<(Load, Trip), AppError> {
        let mut inner = self.inner.write();
        let DepotInner {
            loads,
            trips,
            trucks,
            events,
        } = &mut *inner;

        let load = loads
            .get_mut(load_id)
            .ok_or_else(|| AppError::NotFound(format!("load {load_id} not found")))?;
        let truck = trucks
            .get_mut(truck_id)
            .ok_or_else(|| AppError::NotFound(format!("truck {truck_id} not found")))?;

        if !may_manage_load(principal, &load.shipper_org) {
            return Err(AppError::Forbidden(format!(
                "principal may not manage loads of {}",
                load.shipper_org
            )));
        }
        if !truck.is_available {
            return Err(AppError::Conflict(format!(
                "truck {truck_id} is not available"
            )));
        }

        let trip = Trip::new(
            TripId::new(),
            load.id,
            truck.id,
            truck.carrier_org,
            load.shipper_org,
            now,
        );

        let from = load.status;
        load.assign(truck.id, trip.id, now)?;
        truck.is_available = false;

        events.push(
            TransitionEvent::for_trip(load.id, trip.id, from, load.status, principal.id, now)
                .with_note(format!("assigned to {}", truck.id)),
        );

        let load_snapshot = load.clone();
        trips.insert(trip.id, trip.clone());
        Ok((load_snapshot, trip))
    }

    // ── Trips ───────────────────────────────────────────────────────

    /// Retrieve a trip by id.
    pub fn get_trip(&self, id: &TripId) -> Option<Trip> {
        self.inner.read().trips.get(id).cloned()
    }

    /// List all trips.
    pub fn list_trips(&self) -> Vec<Trip> {
        self.inner.read().trips.values().cloned().collect()
    }

    /// Transition events for one trip, oldest first.
    ///
    /// Returns `None` if the trip does not exist.
    pub fn events_for_trip(&self, id: &TripId) -> Option<Vec<TransitionEvent>> {
        let inner = self.inner.read();
        inner.trips.get(id)?;
        Some(
            inner
                .events
                .iter()
                .filter(|event| event.trip == Some(*id))
                .cloned()
                .collect(),
        )
    }

    /// Apply a trip status transition with its full side-effect set.
    ///
    /// Under one write lock: permission gate, optional expected-status
    /// check, lifecycle validation against the committed status, trip
    /// mutation with milestone stamping, load mirror, terminal side
    /// effects (truck release, tracking off, truck pointer detach), and
    /// event append. On any rejection nothing is mutated.
    pub fn transition_trip(
        &self,
        trip_id: &TripId,
        target: TripStatus,
        expected: Option<TripStatus>,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<(Trip, Load), AppError> {
        let mut inner = self.inner.write();
        let DepotInner {
            loads,
            trips,
            trucks,
            events,
        } = &mut *inner;

        let trip = trips
            .get_mut(trip_id)
            .ok_or_else(|| AppError::NotFound(format!("trip {trip_id} not found")))?;

        if !may_transition_trip(principal, &trip.carrier_org) {
            return Err(AppError::Forbidden(format!(
                "principal may not transition trips of {}",
                trip.carrier_org
            )));
        }

        if let Some(expected) = expected {
            if expected != trip.status {
                return Err(AppError::Conflict(format!(
                    "trip status changed: expected {expected}, found {}",
                    trip.status
                )));
            }
        }

        let load = loads.get_mut(&trip.load).ok_or_else(|| {
            AppError::Internal(format!("trip {trip_id} references missing load"))
        })?;

        let from = trip.status;
        trip.apply(target, load.pod_flags(), principal.id, now)?;
        load.mirror_trip(target, now);

        if target.is_terminal() {
            let truck = trucks.get_mut(&trip.truck).ok_or_else(|| {
                AppError::Internal(format!("trip {trip_id} references missing truck"))
            })?;
            truck.is_available = true;
            load.detach_truck(now);
        }

        events.push(TransitionEvent::for_trip(
            load.id,
            trip.id,
            from,
            target,
            principal.id,
            now,
        ));

        Ok((trip.clone(), load.clone()))
    }

    // ── Proof of delivery ───────────────────────────────────────────

    /// Record the carrier's proof-of-delivery submission.
    pub fn submit_pod(
        &self,
        load_id: &LoadId,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<Load, AppError> {
        let mut inner = self.inner.write();
        let DepotInner { loads, trips, .. } = &mut *inner;

        let load = loads
            .get_mut(load_id)
            .ok_or_else(|| AppError::NotFound(format!("load {load_id} not found")))?;
        let trip = load
            .trip
            .and_then(|id| trips.get(&id))
            .ok_or_else(|| AppError::BadRequest(format!("load {load_id} has no trip")))?;

        if !may_submit_pod(principal, &trip.carrier_org) {
            return Err(AppError::Forbidden(format!(
                "principal may not submit proof of delivery for trips of {}",
                trip.carrier_org
            )));
        }

        load.submit_pod(now)?;
        Ok(load.clone())
    }

    /// Record the shipper's verification of submitted proof.
    pub fn verify_pod(
        &self,
        load_id: &LoadId,
        principal: &Principal,
        now: Timestamp,
    ) -> Result<Load, AppError> {
        let mut inner = self.inner.write();
        let load = inner
            .loads
            .get_mut(load_id)
            .ok_or_else(|| AppError::NotFound(format!("load {load_id} not found")))?;

        if !may_verify_pod(principal, &load.shipper_org) {
            return Err(AppError::Forbidden(format!(
                "principal may not verify proof of delivery for loads of {}",
                load.shipper_org
            )));
        }

        load.verify_pod(now)?;
        Ok(load.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haul_core::{PrincipalId, Role};

    fn now() -> Timestamp {
        Timestamp::now()
    }

    fn shipper(org: OrgId) -> Principal {
        Principal::new(PrincipalId::new(), Role::Shipper, org)
    }

    fn carrier(org: OrgId) -> Principal {
        Principal::new(PrincipalId::new(), Role::Carrier, org)
    }

    fn dispatcher() -> Principal {
        Principal::elevated(PrincipalId::new(), Role::Dispatcher)
    }

    /// Depot with one posted load and one available truck, ready to assign.
    fn board() -> (Depot, Load, Truck, Principal, Principal) {
        let depot = Depot::new();
        let shipper_org = OrgId::new();
        let carrier_org = OrgId::new();
        let shipper = shipper(shipper_org);
        let carrier = carrier(carrier_org);

        let load = depot.create_load(
            shipper_org,
            "Karachi Port".into(),
            "Lahore Dry Port".into(),
            now(),
        );
        let load = depot.post_load(&load.id, &shipper, now()).unwrap();
        let truck = depot.create_truck(carrier_org, "LES-4821".into(), now());
        (depot, load, truck, shipper, carrier)
    }

    /// Board plus an assigned trip.
    fn assigned() -> (Depot, Load, Trip, Principal, Principal) {
        let (depot, load, truck, shipper, carrier) = board();
        let (load, trip) = depot
            .assign_load(&load.id, &truck.id, &shipper, now())
            .unwrap();
        (depot, load, trip, shipper, carrier)
    }

    /// Drive a trip to DELIVERED.
    fn delivered() -> (Depot, Load, Trip, Principal, Principal) {
        let (depot, load, trip, shipper, carrier) = assigned();
        for target in [
            TripStatus::PickupPending,
            TripStatus::InTransit,
            TripStatus::Delivered,
        ] {
            depot
                .transition_trip(&trip.id, target, None, &carrier, now())
                .unwrap();
        }
        let trip = depot.get_trip(&trip.id).unwrap();
        let load = depot.get_load(&load.id).unwrap();
        (depot, load, trip, shipper, carrier)
    }

    // ── Assignment ───────────────────────────────────────────────────

    #[test]
    fn test_assignment_takes_truck_out_of_circulation() {
        let (depot, load, trip, _, _) = assigned();
        assert_eq!(load.status.name(), "ASSIGNED");
        assert_eq!(trip.status, TripStatus::Assigned);
        assert_eq!(load.trip, Some(trip.id));
        assert!(!depot.get_truck(&trip.truck).unwrap().is_available);
    }

    #[test]
    fn test_cannot_assign_busy_truck() {
        let (depot, _, trip, shipper, _) = assigned();
        let second = depot.create_load(
            shipper.org.unwrap(),
            "Multan".into(),
            "Quetta".into(),
            now(),
        );
        depot.post_load(&second.id, &shipper, now()).unwrap();
        let result = depot.assign_load(&second.id, &trip.truck, &shipper, now());
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_cannot_assign_unposted_load() {
        let (depot, _, truck, shipper, _) = board();
        let draft = depot.create_load(
            shipper.org.unwrap(),
            "Multan".into(),
            "Quetta".into(),
            now(),
        );
        let result = depot.assign_load(&draft.id, &truck.id, &shipper, now());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    // ── Trip transitions ─────────────────────────────────────────────

    #[test]
    fn test_carrier_drives_trip_forward() {
        let (depot, _, trip, _, carrier) = assigned();
        let (trip, load) = depot
            .transition_trip(&trip.id, TripStatus::PickupPending, None, &carrier, now())
            .unwrap();
        assert_eq!(trip.status, TripStatus::PickupPending);
        assert_eq!(load.status.name(), "PICKUP_PENDING");
        assert!(trip.started_at.is_some());
    }

    #[test]
    fn test_shipper_may_not_transition_trip() {
        let (depot, _, trip, shipper, _) = assigned();
        let result =
            depot.transition_trip(&trip.id, TripStatus::PickupPending, None, &shipper, now());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        // Nothing moved.
        assert_eq!(depot.get_trip(&trip.id).unwrap().status, TripStatus::Assigned);
    }

    #[test]
    fn test_foreign_carrier_may_not_transition_trip() {
        let (depot, _, trip, _, _) = assigned();
        let outsider = carrier(OrgId::new());
        let result =
            depot.transition_trip(&trip.id, TripStatus::PickupPending, None, &outsider, now());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_dispatcher_may_transition_any_trip() {
        let (depot, _, trip, _, _) = assigned();
        let result =
            depot.transition_trip(&trip.id, TripStatus::PickupPending, None, &dispatcher(), now());
        assert!(result.is_ok());
    }

    #[test]
    fn test_skip_transition_rejected() {
        let (depot, _, trip, _, carrier) = assigned();
        let result =
            depot.transition_trip(&trip.id, TripStatus::InTransit, None, &carrier, now());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_expected_status_mismatch_conflicts_without_mutation() {
        let (depot, _, trip, _, carrier) = assigned();
        depot
            .transition_trip(&trip.id, TripStatus::PickupPending, None, &carrier, now())
            .unwrap();

        // A client that still believes the trip is ASSIGNED loses the race.
        let result = depot.transition_trip(
            &trip.id,
            TripStatus::Cancelled,
            Some(TripStatus::Assigned),
            &carrier,
            now(),
        );
        assert!(matches!(result, Err(AppError::Conflict(_))));
        let current = depot.get_trip(&trip.id).unwrap();
        assert_eq!(current.status, TripStatus::PickupPending);
        assert!(current.cancelled_at.is_none());
    }

    #[test]
    fn test_racing_transitions_second_loses() {
        // Two clients both observed ASSIGNED; the progress request lands
        // first, so the cancel re-validates against PICKUP_PENDING and,
        // with the expected-status check, conflicts.
        let (depot, _, trip, _, carrier) = assigned();
        depot
            .transition_trip(
                &trip.id,
                TripStatus::PickupPending,
                Some(TripStatus::Assigned),
                &carrier,
                now(),
            )
            .unwrap();
        let result = depot.transition_trip(
            &trip.id,
            TripStatus::Cancelled,
            Some(TripStatus::Assigned),
            &carrier,
            now(),
        );
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    // ── POD gate and completion ──────────────────────────────────────

    #[test]
    fn test_completion_blocked_without_pod() {
        let (depot, _, trip, _, carrier) = delivered();
        let result =
            depot.transition_trip(&trip.id, TripStatus::Completed, None, &carrier, now());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_completion_blocked_with_unverified_pod() {
        let (depot, load, trip, _, carrier) = delivered();
        depot.submit_pod(&load.id, &carrier, now()).unwrap();
        let result =
            depot.transition_trip(&trip.id, TripStatus::Completed, None, &carrier, now());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_full_completion_restores_truck() {
        let (depot, load, trip, shipper, carrier) = delivered();
        assert!(!depot.get_truck(&trip.truck).unwrap().is_available);

        depot.submit_pod(&load.id, &carrier, now()).unwrap();
        depot.verify_pod(&load.id, &shipper, now()).unwrap();
        let (trip, load) = depot
            .transition_trip(&trip.id, TripStatus::Completed, None, &carrier, now())
            .unwrap();

        assert_eq!(trip.status, TripStatus::Completed);
        assert_eq!(load.status.name(), "COMPLETED");
        assert!(depot.get_truck(&trip.truck).unwrap().is_available);
        assert!(load.assigned_truck.is_none());
        assert!(!load.tracking_enabled);
        // The historical trip record keeps the truck reference.
        assert_eq!(depot.get_trip(&trip.id).unwrap().truck, trip.truck);
    }

    #[test]
    fn test_cancellation_restores_truck_mid_transit() {
        let (depot, _, trip, _, carrier) = assigned();
        depot
            .transition_trip(&trip.id, TripStatus::PickupPending, None, &carrier, now())
            .unwrap();
        depot
            .transition_trip(&trip.id, TripStatus::InTransit, None, &carrier, now())
            .unwrap();
        let (trip, load) = depot
            .transition_trip(&trip.id, TripStatus::Cancelled, None, &carrier, now())
            .unwrap();

        assert_eq!(trip.status, TripStatus::Cancelled);
        assert_eq!(trip.cancelled_by, Some(carrier.id));
        assert_eq!(load.status.name(), "CANCELLED");
        assert!(depot.get_truck(&trip.truck).unwrap().is_available);
        assert!(load.assigned_truck.is_none());
    }

    #[test]
    fn test_pod_submission_requires_carrier_side() {
        let (depot, load, _, shipper, _) = delivered();
        let result = depot.submit_pod(&load.id, &shipper, now());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_pod_verification_requires_shipper_side() {
        let (depot, load, _, _, carrier) = delivered();
        depot.submit_pod(&load.id, &carrier, now()).unwrap();
        let result = depot.verify_pod(&load.id, &carrier, now());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    // ── Events ───────────────────────────────────────────────────────

    #[test]
    fn test_events_appended_per_accepted_transition() {
        let (depot, _, trip, _, carrier) = assigned();
        depot
            .transition_trip(&trip.id, TripStatus::PickupPending, None, &carrier, now())
            .unwrap();
        depot
            .transition_trip(&trip.id, TripStatus::Cancelled, None, &carrier, now())
            .unwrap();

        let events = depot.events_for_trip(&trip.id).unwrap();
        // Assignment + two transitions.
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].from, "ASSIGNED");
        assert_eq!(events[1].to, "PICKUP_PENDING");
        assert_eq!(events[2].to, "CANCELLED");
    }

    #[test]
    fn test_rejected_transition_appends_nothing() {
        let (depot, _, trip, _, carrier) = assigned();
        let before = depot.events_for_trip(&trip.id).unwrap().len();
        let _ = depot.transition_trip(&trip.id, TripStatus::Delivered, None, &carrier, now());
        assert_eq!(depot.events_for_trip(&trip.id).unwrap().len(), before);
    }

    #[test]
    fn test_events_for_unknown_trip_is_none() {
        let depot = Depot::new();
        assert!(depot.events_for_trip(&TripId::new()).is_none());
    }

    // ── Load board operations ────────────────────────────────────────

    #[test]
    fn test_foreign_shipper_may_not_post() {
        let depot = Depot::new();
        let load = depot.create_load(OrgId::new(), "A".into(), "B".into(), now());
        let outsider = shipper(OrgId::new());
        let result = depot.post_load(&load.id, &outsider, now());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_unknown_load_is_not_found() {
        let depot = Depot::new();
        let result = depot.post_load(&LoadId::new(), &dispatcher(), now());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
