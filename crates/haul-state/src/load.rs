//! # Load Posting Lifecycle
//!
//! Models a shipper's load from draft through posting, assignment, and the
//! mirrored execution stages of its trip.
//!
//! ## States
//!
//! ```text
//! Draft ──▶ Posted ⇄ Unposted          (pre-assignment machine)
//!             │  │
//!             │  └──▶ Expired (terminal)
//!             ▼
//!          Assigned ──▶ PickupPending ──▶ InTransit ──▶ Delivered ──▶ Completed
//!                                 (mirrored from the trip machine)
//!
//! Cancelled (terminal) is reachable from Draft, Posted, and Unposted
//! directly; post-assignment cancellation arrives via the trip mirror.
//! ```
//!
//! The pre-assignment stages and the post-assignment stages are two
//! logically distinct machines sharing one status enum for storage. The
//! load's own operations (`post`, `unpost`, `expire`, `cancel`) only move
//! between pre-assignment stages; once assigned, `Load.status` is a
//! projection of `Trip.status` updated through [`Load::mirror_trip`] in
//! the same atomic unit as the trip mutation, never independently.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use haul_core::{LoadId, OrgId, Timestamp, TripId, TruckId};

use crate::trip::{PodFlags, TripStatus};

// ─── Load Status ─────────────────────────────────────────────────────

/// The lifecycle status of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    /// Being drafted by the shipper, not visible to carriers.
    Draft,
    /// Visible on the load board, open for assignment.
    Posted,
    /// Withdrawn from the board; may be posted again.
    Unposted,
    /// Assigned to a truck; a trip now exists.
    Assigned,
    /// Mirrors the trip: truck en route to pickup.
    PickupPending,
    /// Mirrors the trip: cargo moving.
    InTransit,
    /// Mirrors the trip: cargo dropped, awaiting POD verification.
    Delivered,
    /// Mirrors the trip: settled and closed (terminal).
    Completed,
    /// Cancelled before or during execution (terminal).
    Cancelled,
    /// Expired off the board without assignment (terminal).
    Expired,
}

impl LoadStatus {
    /// The canonical status name (e.g., `PICKUP_PENDING`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Posted => "POSTED",
            Self::Unposted => "UNPOSTED",
            Self::Assigned => "ASSIGNED",
            Self::PickupPending => "PICKUP_PENDING",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Whether this status permits zero outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// Whether this status belongs to the pre-assignment machine.
    pub fn is_pre_assignment(&self) -> bool {
        matches!(self, Self::Draft | Self::Posted | Self::Unposted)
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Settlement position of a completed load.
///
/// Settlement itself (escrow release, service fees) runs in the payments
/// pipeline; this record only tracks whether that pipeline has reported
/// the load as settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    /// No settlement reported yet.
    Pending,
    /// Funds released and fees collected.
    Settled,
}

impl SettlementStatus {
    /// The canonical name (`PENDING` / `SETTLED`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Settled => "SETTLED",
        }
    }
}

/// Map a trip status onto the load status vocabulary.
fn mirror_of(status: TripStatus) -> LoadStatus {
    match status {
        TripStatus::Assigned => LoadStatus::Assigned,
        TripStatus::PickupPending => LoadStatus::PickupPending,
        TripStatus::InTransit => LoadStatus::InTransit,
        TripStatus::Delivered => LoadStatus::Delivered,
        TripStatus::Completed => LoadStatus::Completed,
        TripStatus::Cancelled => LoadStatus::Cancelled,
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during load lifecycle operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The requested transition is not valid from the current status.
    #[error("invalid load transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: LoadStatus,
        /// Requested target status.
        to: LoadStatus,
    },

    /// The load is in a terminal status.
    #[error("load is in terminal status {status}")]
    Terminal {
        /// The terminal status.
        status: LoadStatus,
    },

    /// Proof of delivery can only be submitted while the load is DELIVERED.
    #[error("proof of delivery cannot be submitted while load is {status}")]
    PodNotSubmittable {
        /// The load's current status.
        status: LoadStatus,
    },

    /// Proof of delivery has not been submitted yet.
    #[error("proof of delivery has not been submitted")]
    PodNotSubmitted,
}

// ─── Load ────────────────────────────────────────────────────────────

/// A shipper's freight shipment request.
///
/// Never physically deleted once assigned — terminal statuses are
/// soft-terminal and the record is retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Load {
    /// Unique load identifier.
    pub id: LoadId,
    /// The shipper organization that owns the load.
    pub shipper_org: OrgId,
    /// Pickup location (free-form address).
    pub origin: String,
    /// Drop-off location (free-form address).
    pub destination: String,
    /// Current lifecycle status.
    pub status: LoadStatus,
    /// The truck currently assigned, if any.
    ///
    /// Detached on terminal transitions so the truck can be reassigned;
    /// the historical trip record keeps the truck reference.
    pub assigned_truck: Option<TruckId>,
    /// The trip fulfilling this load, if assigned. At most one, ever.
    pub trip: Option<TripId>,
    /// Carrier has uploaded proof of delivery.
    pub pod_submitted: bool,
    /// Shipper has verified the submitted proof.
    pub pod_verified: bool,
    /// When proof of delivery was submitted.
    pub pod_submitted_at: Option<Timestamp>,
    /// When proof of delivery was verified.
    pub pod_verified_at: Option<Timestamp>,
    /// Whether GPS tracking is live for this load.
    pub tracking_enabled: bool,
    /// Settlement position, reported by the payments pipeline.
    pub settlement_status: SettlementStatus,
    /// When the load was created.
    pub created_at: Timestamp,
    /// When the load was last mutated.
    pub updated_at: Timestamp,
}

impl Load {
    /// Create a new load in the `Draft` status.
    pub fn new(
        id: LoadId,
        shipper_org: OrgId,
        origin: String,
        destination: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            shipper_org,
            origin,
            destination,
            status: LoadStatus::Draft,
            assigned_truck: None,
            trip: None,
            pod_submitted: false,
            pod_verified: false,
            pod_submitted_at: None,
            pod_verified_at: None,
            tracking_enabled: false,
            settlement_status: SettlementStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Post the load to the board (`Draft -> Posted` or `Unposted -> Posted`).
    pub fn post(&mut self, now: Timestamp) -> Result<(), LoadError> {
        if !matches!(self.status, LoadStatus::Draft | LoadStatus::Unposted) {
            return Err(self.reject(LoadStatus::Posted));
        }
        self.set_status(LoadStatus::Posted, now);
        Ok(())
    }

    /// Withdraw the load from the board (`Posted -> Unposted`).
    pub fn unpost(&mut self, now: Timestamp) -> Result<(), LoadError> {
        self.require_status(LoadStatus::Posted, LoadStatus::Unposted)?;
        self.set_status(LoadStatus::Unposted, now);
        Ok(())
    }

    /// Expire the load off the board (`Posted -> Expired`).
    ///
    /// Typically driven by a board-sweep deadline check.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), LoadError> {
        self.require_status(LoadStatus::Posted, LoadStatus::Expired)?;
        self.set_status(LoadStatus::Expired, now);
        Ok(())
    }

    /// Cancel an unassigned load (`Draft | Posted | Unposted -> Cancelled`).
    ///
    /// Once a trip exists, cancellation goes through the trip machine and
    /// arrives here via [`Load::mirror_trip`].
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), LoadError> {
        if self.status.is_terminal() {
            return Err(LoadError::Terminal {
                status: self.status,
            });
        }
        if !self.status.is_pre_assignment() {
            return Err(self.reject(LoadStatus::Cancelled));
        }
        self.set_status(LoadStatus::Cancelled, now);
        Ok(())
    }

    /// Bind the load to a truck and trip (`Posted -> Assigned`).
    ///
    /// Enables tracking for the execution phase. The caller is
    /// responsible for flipping the truck's availability in the same
    /// atomic unit.
    pub fn assign(
        &mut self,
        truck: TruckId,
        trip: TripId,
        now: Timestamp,
    ) -> Result<(), LoadError> {
        self.require_status(LoadStatus::Posted, LoadStatus::Assigned)?;
        self.assigned_truck = Some(truck);
        self.trip = Some(trip);
        self.tracking_enabled = true;
        self.set_status(LoadStatus::Assigned, now);
        Ok(())
    }

    /// Project the trip's status onto the load, in the caller's atomic unit.
    pub fn mirror_trip(&mut self, status: TripStatus, now: Timestamp) {
        self.set_status(mirror_of(status), now);
    }

    /// Detach the assigned truck and stop tracking.
    ///
    /// Called on terminal trip transitions; the trip record retains the
    /// truck reference for audit.
    pub fn detach_truck(&mut self, now: Timestamp) {
        self.assigned_truck = None;
        self.tracking_enabled = false;
        self.updated_at = now;
    }

    /// Record the carrier's proof-of-delivery submission.
    ///
    /// Only valid while the load is `Delivered`. The submission timestamp
    /// is stamped once; a repeated submission refreshes nothing.
    pub fn submit_pod(&mut self, now: Timestamp) -> Result<(), LoadError> {
        if self.status != LoadStatus::Delivered {
            return Err(LoadError::PodNotSubmittable {
                status: self.status,
            });
        }
        self.pod_submitted = true;
        self.pod_submitted_at.get_or_insert(now);
        self.updated_at = now;
        Ok(())
    }

    /// Record the shipper's verification of the submitted proof.
    pub fn verify_pod(&mut self, now: Timestamp) -> Result<(), LoadError> {
        if !self.pod_submitted {
            return Err(LoadError::PodNotSubmitted);
        }
        self.pod_verified = true;
        self.pod_verified_at.get_or_insert(now);
        self.updated_at = now;
        Ok(())
    }

    /// Record the payments pipeline's settlement report.
    pub fn mark_settled(&mut self, now: Timestamp) {
        self.settlement_status = SettlementStatus::Settled;
        self.updated_at = now;
    }

    /// The load's POD flags, as read by the trip completion gate.
    pub fn pod_flags(&self) -> PodFlags {
        PodFlags {
            submitted: self.pod_submitted,
            verified: self.pod_verified,
        }
    }

    /// Whether the load is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Validate that the load is in the expected pre-assignment status.
    fn require_status(&self, expected: LoadStatus, to: LoadStatus) -> Result<(), LoadError> {
        if self.status.is_terminal() {
            return Err(LoadError::Terminal {
                status: self.status,
            });
        }
        if self.status != expected {
            return Err(self.reject(to));
        }
        Ok(())
    }

    fn reject(&self, to: LoadStatus) -> LoadError {
        LoadError::InvalidTransition {
            from: self.status,
            to,
        }
    }

    fn set_status(&mut self, to: LoadStatus, now: Timestamp) {
        self.status = to;
        self.updated_at = now;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
