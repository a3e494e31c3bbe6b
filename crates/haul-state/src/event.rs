//! # Transition Event Log
//!
//! Append-only records of accepted status transitions. Every accepted
//! transition — load posting moves, assignment, and trip execution moves —
//! appends exactly one event in the same atomic unit as the mutation it
//! describes. Rejected transitions append nothing.
//!
//! Events carry the status names as strings so one log covers both the
//! load and trip vocabularies.

use serde::{Deserialize, Serialize};

use haul_core::{LoadId, PrincipalId, Timestamp, TripId};

/// Record of a single accepted status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// The load the transition belongs to.
    pub load: LoadId,
    /// The trip, when the transition is post-assignment.
    pub trip: Option<TripId>,
    /// Status before the transition.
    pub from: String,
    /// Status after the transition.
    pub to: String,
    /// The principal that drove the transition.
    pub actor: PrincipalId,
    /// When the transition was applied.
    pub timestamp: Timestamp,
    /// Free-form context (e.g., cancellation reason).
    pub note: Option<String>,
}

impl TransitionEvent {
    /// Build an event for a load-machine transition.
    pub fn for_load(
        load: LoadId,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
        actor: PrincipalId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            load,
            trip: None,
            from: from.to_string(),
            to: to.to_string(),
            actor,
            timestamp,
            note: None,
        }
    }

    /// Build an event for a trip-machine transition.
    pub fn for_trip(
        load: LoadId,
        trip: TripId,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
        actor: PrincipalId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            load,
            trip: Some(trip),
            from: from.to_string(),
            to: to.to_string(),
            actor,
            timestamp,
            note: None,
        }
    }

    /// Attach a free-form note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::TripStatus;

    #[test]
    fn test_trip_event_captures_status_names() {
        let event = TransitionEvent::for_trip(
            LoadId::new(),
            TripId::new(),
            TripStatus::Assigned,
            TripStatus::PickupPending,
            PrincipalId::new(),
            Timestamp::now(),
        );
        assert_eq!(event.from, "ASSIGNED");
        assert_eq!(event.to, "PICKUP_PENDING");
        assert!(event.trip.is_some());
        assert!(event.note.is_none());
    }

    #[test]
    fn test_with_note() {
        let event = TransitionEvent::for_load(
            LoadId::new(),
            "DRAFT",
            "POSTED",
            PrincipalId::new(),
            Timestamp::now(),
        )
        .with_note("posted by board sweep");
        assert_eq!(event.note.as_deref(), Some("posted by board sweep"));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let event = TransitionEvent::for_load(
            LoadId::new(),
            "POSTED",
            "EXPIRED",
            PrincipalId::new(),
            Timestamp::now(),
        );
        let json = serde_json::to_string(&event).unwrap();
        let parsed: TransitionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.from, event.from);
        assert_eq!(parsed.load, event.load);
    }
}
