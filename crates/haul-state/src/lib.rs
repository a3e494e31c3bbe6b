//! # haul-state — Lifecycle State Machines
//!
//! Implements the lifecycle state machines of the Haulstack platform as
//! pure domain logic: no I/O, no locking, no persistence. The API layer
//! owns the atomic application of accepted transitions; this crate owns
//! the decision of what is allowed.
//!
//! ## State Machines
//!
//! - **Load** (`load.rs`): the posting lifecycle
//!   (`Draft → Posted ⇄ Unposted`, with `Expired` and `Cancelled`
//!   branches), assignment into a trip, the proof-of-delivery flags, and
//!   the mirror that keeps `Load.status` in lockstep with its trip.
//!
//! - **Trip** (`trip.rs`): the execution lifecycle
//!   (`Assigned → PickupPending → InTransit → Delivered → Completed`,
//!   `Cancelled` reachable from any non-terminal state). Forward-only,
//!   single-step, with the proof-of-delivery gate on completion and
//!   exactly-once milestone timestamp stamping.
//!
//! ## Design
//!
//! The transition validator is a pure function of
//! `(current, target, pod flags)` — it can be exhaustively unit-tested
//! without a database or a running server. Authorization is likewise a
//! pure predicate over `(principal, owning organization)` in `authz.rs`.
//! Side effects (truck availability, event log, load mirroring) happen in
//! the caller's transaction, never here.

pub mod authz;
pub mod event;
pub mod load;
pub mod trip;
pub mod truck;

// ─── Load re-exports ────────────────────────────────────────────────

pub use load::{Load, LoadError, LoadStatus, SettlementStatus};

// ─── Trip re-exports ────────────────────────────────────────────────

pub use trip::{validate_transition, PodFlags, Trip, TripError, TripStatus};

// ─── Truck / event re-exports ───────────────────────────────────────

pub use event::TransitionEvent;
pub use truck::Truck;

// ─── Authorization re-exports ───────────────────────────────────────

pub use authz::{may_manage_load, may_submit_pod, may_transition_trip, may_verify_pod};
