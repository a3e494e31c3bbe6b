//! # Truck Records
//!
//! A carrier's truck and its availability flag. Availability is custody:
//! `is_available` is true whenever the truck is not actively serving a
//! non-terminal trip, and is restored exactly when its trip reaches a
//! terminal status. The flag flips only inside the same atomic unit as
//! the trip mutation that justifies it.

use serde::{Deserialize, Serialize};

use haul_core::{OrgId, Timestamp, TruckId};

/// A truck registered by a carrier organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    /// Unique truck identifier.
    pub id: TruckId,
    /// The carrier organization that owns the truck.
    pub carrier_org: OrgId,
    /// Registration plate.
    pub plate: String,
    /// Whether the truck is free to take a new trip.
    pub is_available: bool,
    /// When the truck was registered.
    pub created_at: Timestamp,
}

impl Truck {
    /// Register a new truck; available until assigned.
    pub fn new(id: TruckId, carrier_org: OrgId, plate: String, now: Timestamp) -> Self {
        Self {
            id,
            carrier_org,
            plate,
            is_available: true,
            created_at: now,
        }
    }
}
