//! # haul-core — Foundational Types for Haulstack
//!
//! The bedrock of the Haulstack freight platform. Defines the vocabulary
//! shared by the lifecycle state machines and the API service: identifier
//! newtypes, UTC-only timestamps, and the closed role/principal model.
//! Every other crate in the workspace depends on `haul-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `LoadId`, `TripId`,
//!    `TruckId`, `OrgId`, `PrincipalId` — you cannot pass a truck where a
//!    trip is expected. No bare UUIDs or strings at module boundaries.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Trip milestone timestamps recorded in
//!    two different handler processes must compare and serialize identically.
//!
//! 3. **Closed `Role` enum.** Authorization decisions match exhaustively on
//!    the four platform roles; adding a role forces every capability check
//!    to handle it at compile time. No role-name strings in business logic.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `haul-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod principal;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::ValidationError;
pub use identity::{LoadId, OrgId, PrincipalId, TripId, TruckId};
pub use principal::{Principal, Role};
pub use temporal::Timestamp;
