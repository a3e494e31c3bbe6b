//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers on the platform. These
//! prevent accidental identifier confusion — you cannot pass a `TruckId`
//! where a `LoadId` is expected, even though both wrap a UUID.
//!
//! The `Display` impls prefix the namespace (`load:<uuid>`) so identifiers
//! remain unambiguous in logs and event records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate the constructor, accessor, and `Display` impls shared by all
/// identifier newtypes.
macro_rules! impl_identity {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

/// Unique identifier for a load (a shipper's freight shipment request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadId(pub Uuid);

/// Unique identifier for a trip (the fulfillment of one load by one truck).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId(pub Uuid);

/// Unique identifier for a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TruckId(pub Uuid);

/// Unique identifier for an organization (shipper or carrier company).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgId(pub Uuid);

/// Unique identifier for an acting principal (a platform user account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl_identity!(LoadId, "load");
impl_identity!(TripId, "trip");
impl_identity!(TruckId, "truck");
impl_identity!(OrgId, "org");
impl_identity!(PrincipalId, "principal");
