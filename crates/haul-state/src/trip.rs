//! # Trip Execution State Machine
//!
//! Models the execution of one load by one truck, from assignment through
//! completion or cancellation.
//!
//! ## States
//!
//! ```text
//! Assigned ──▶ PickupPending ──▶ InTransit ──▶ Delivered ──▶ Completed
//!     │              │               │             │        (POD gate)
//!     └──────────────┴───────────────┴─────────────┘
//!                         │
//!                         ▼
//!                     Cancelled (terminal)
//! ```
//!
//! ## Rules
//!
//! Transitions are forward-only and single-step: the only permitted target
//! from a state is its immediate successor, except `Cancelled`, which is
//! reachable from any non-terminal state. Self-transitions are rejected.
//! `Completed` and `Cancelled` permit zero outgoing transitions.
//! `Delivered → Completed` additionally requires proof of delivery to be
//! both submitted and verified on the associated load.
//!
//! ## Design Decision
//!
//! The trip machine is an enum with a validated-transition function rather
//! than one type per state. The states are strictly sequential and the
//! invariant (only the successor, or cancel) is a single table lookup, so
//! runtime validation with structured rejection errors carries the full
//! safety story while keeping the record persistable as one type.
//! [`validate_transition`] is a pure function of
//! `(current, target, pod flags)` and performs no I/O — callers apply the
//! accepted transition inside their own transactional unit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use haul_core::{LoadId, OrgId, PrincipalId, Timestamp, TripId, TruckId};

// ─── Trip Status ─────────────────────────────────────────────────────

/// The execution status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    /// Truck assigned, execution not yet started.
    Assigned,
    /// Truck is en route to the pickup location.
    PickupPending,
    /// Cargo on board, truck is moving toward the destination.
    InTransit,
    /// Cargo dropped at the destination, awaiting proof-of-delivery
    /// verification.
    Delivered,
    /// Trip settled and closed (terminal).
    Completed,
    /// Trip aborted (terminal).
    Cancelled,
}

impl TripStatus {
    /// The canonical status name (e.g., `PICKUP_PENDING`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assigned => "ASSIGNED",
            Self::PickupPending => "PICKUP_PENDING",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// The single permitted forward successor, if any.
    ///
    /// `Cancelled` is not a successor — it is reachable from every
    /// non-terminal state and handled separately by the validator.
    pub fn successor(&self) -> Option<TripStatus> {
        match self {
            Self::Assigned => Some(Self::PickupPending),
            Self::PickupPending => Some(Self::InTransit),
            Self::InTransit => Some(Self::Delivered),
            Self::Delivered => Some(Self::Completed),
            Self::Completed | Self::Cancelled => None,
        }
    }

    /// Whether this status permits zero outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Proof-of-Delivery Flags ─────────────────────────────────────────

/// The proof-of-delivery flags read from the associated load.
///
/// Completion is gated on both: the carrier must have submitted the
/// document and the shipper must have verified it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PodFlags {
    /// Carrier has uploaded proof of delivery.
    pub submitted: bool,
    /// Shipper has verified the submitted proof.
    pub verified: bool,
}

impl PodFlags {
    /// Whether the completion gate is satisfied.
    pub fn satisfied(&self) -> bool {
        self.submitted && self.verified
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during trip status transitions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TripError {
    /// The requested `(from, to)` pair is not in the permitted table.
    /// Covers backward, skip, self, and out-of-terminal transitions.
    #[error("invalid trip transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: TripStatus,
        /// Requested target status.
        to: TripStatus,
    },

    /// Completion attempted without satisfied proof of delivery.
    #[error(
        "proof of delivery not satisfied: submitted={submitted}, verified={verified}"
    )]
    PodNotSatisfied {
        /// Whether the carrier has submitted the document.
        submitted: bool,
        /// Whether the shipper has verified it.
        verified: bool,
    },
}

// ─── Transition Validator ────────────────────────────────────────────

/// Decide whether `from -> to` is a permitted trip transition.
///
/// Pure function: no I/O, no clock, no lock. All rules must hold:
///
/// 1. `from` must not be terminal.
/// 2. No self-transition.
/// 3. `to` must be the single successor of `from`, or `Cancelled`.
/// 4. `Delivered -> Completed` requires both POD flags.
pub fn validate_transition(
    from: TripStatus,
    to: TripStatus,
    pod: PodFlags,
) -> Result<(), TripError> {
    if from.is_terminal() || from == to {
        return Err(TripError::InvalidTransition { from, to });
    }

    let shape_ok = to == TripStatus::Cancelled || from.successor() == Some(to);
    if !shape_ok {
        return Err(TripError::InvalidTransition { from, to });
    }

    if from == TripStatus::Delivered && to == TripStatus::Completed && !pod.satisfied() {
        return Err(TripError::PodNotSatisfied {
            submitted: pod.submitted,
            verified: pod.verified,
        });
    }

    Ok(())
}

// ─── Trip ────────────────────────────────────────────────────────────

/// The fulfillment record binding a load to a truck and carrier.
///
/// Created when a load is assigned; mutated only through [`Trip::apply`];
/// immutable once `Completed` or `Cancelled` (every further transition is
/// rejected by the validator). Milestone timestamps are stamped exactly
/// once — a repeated stamp attempt never overwrites an earlier value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Unique trip identifier.
    pub id: TripId,
    /// The load this trip fulfills.
    pub load: LoadId,
    /// The truck in exclusive custody for the trip's active duration.
    ///
    /// Retained after terminal transitions for audit, even though the
    /// load's own truck pointer is detached.
    pub truck: TruckId,
    /// The carrier organization running the trip.
    pub carrier_org: OrgId,
    /// The shipper organization that owns the load.
    pub shipper_org: OrgId,
    /// Current execution status.
    pub status: TripStatus,
    /// When the trip was created (assignment time).
    pub created_at: Timestamp,
    /// When execution started (`Assigned -> PickupPending`).
    pub started_at: Option<Timestamp>,
    /// When the cargo was picked up (`PickupPending -> InTransit`).
    pub picked_up_at: Option<Timestamp>,
    /// When the cargo was delivered (`InTransit -> Delivered`).
    pub delivered_at: Option<Timestamp>,
    /// When the trip completed (`Delivered -> Completed`).
    pub completed_at: Option<Timestamp>,
    /// When the trip was cancelled.
    pub cancelled_at: Option<Timestamp>,
    /// Who cancelled the trip, if it was cancelled.
    pub cancelled_by: Option<PrincipalId>,
}

impl Trip {
    /// Create a new trip in the `Assigned` status.
    pub fn new(
        id: TripId,
        load: LoadId,
        truck: TruckId,
        carrier_org: OrgId,
        shipper_org: OrgId,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            load,
            truck,
            carrier_org,
            shipper_org,
            status: TripStatus::Assigned,
            created_at: now,
            started_at: None,
            picked_up_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            cancelled_by: None,
        }
    }

    /// Validate and apply a status transition.
    ///
    /// On acceptance: sets the status, stamps the matching milestone
    /// timestamp (once), and records the cancelling principal on
    /// cancellation. On rejection the trip is untouched.
    pub fn apply(
        &mut self,
        to: TripStatus,
        pod: PodFlags,
        actor: PrincipalId,
        now: Timestamp,
    ) -> Result<(), TripError> {
        validate_transition(self.status, to, pod)?;

        self.stamp(to, now);
        if to == TripStatus::Cancelled {
            self.cancelled_by.get_or_insert(actor);
        }
        self.status = to;
        Ok(())
    }

    /// Whether the trip is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Stamp the milestone timestamp for the target status, exactly once.
    fn stamp(&mut self, to: TripStatus, now: Timestamp) {
        let slot = match to {
            TripStatus::PickupPending => &mut self.started_at,
            TripStatus::InTransit => &mut self.picked_up_at,
            TripStatus::Delivered => &mut self.delivered_at,
            TripStatus::Completed => &mut self.completed_at,
            TripStatus::Cancelled => &mut self.cancelled_at,
            // Assigned is the creation status; created_at already covers it.
            TripStatus::Assigned => return,
        };
        slot.get_or_insert(now);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
