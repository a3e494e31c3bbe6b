//! # Trip and Load Capability Predicates
//!
//! Pure authorization predicates over `(principal, owning organization)`.
//! No state, no I/O — the API layer resolves the principal and calls these
//! before any transition logic runs.
//!
//! Authorization is by capability, matched exhaustively on [`Role`], never
//! by comparing role-name strings at call sites.

use haul_core::{OrgId, Principal, Role};

/// Whether the principal may drive trip-status transitions for a trip run
/// by `carrier_org`.
///
/// - Carriers may transition trips belonging to their own organization.
/// - Shippers may never initiate a trip-status transition.
/// - Dispatchers and admins may transition any trip.
pub fn may_transition_trip(principal: &Principal, carrier_org: &OrgId) -> bool {
    match principal.role {
        Role::Admin | Role::Dispatcher => true,
        Role::Carrier => principal.acts_for(carrier_org),
        Role::Shipper => false,
    }
}

/// Whether the principal may manage (post/unpost/cancel/expire/assign) a
/// load owned by `shipper_org`.
pub fn may_manage_load(principal: &Principal, shipper_org: &OrgId) -> bool {
    match principal.role {
        Role::Admin | Role::Dispatcher => true,
        Role::Shipper => principal.acts_for(shipper_org),
        Role::Carrier => false,
    }
}

/// Whether the principal may submit proof of delivery for a trip run by
/// `carrier_org`. Same capability as driving the trip.
pub fn may_submit_pod(principal: &Principal, carrier_org: &OrgId) -> bool {
    may_transition_trip(principal, carrier_org)
}

/// Whether the principal may verify submitted proof of delivery for a
/// load owned by `shipper_org`. Same capability as managing the load.
pub fn may_verify_pod(principal: &Principal, shipper_org: &OrgId) -> bool {
    may_manage_load(principal, shipper_org)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haul_core::PrincipalId;

    fn carrier_of(org: OrgId) -> Principal {
        Principal::new(PrincipalId::new(), Role::Carrier, org)
    }

    fn shipper_of(org: OrgId) -> Principal {
        Principal::new(PrincipalId::new(), Role::Shipper, org)
    }

    #[test]
    fn test_carrier_may_transition_own_trips() {
        let org = OrgId::new();
        assert!(may_transition_trip(&carrier_of(org), &org));
    }

    #[test]
    fn test_carrier_may_not_transition_foreign_trips() {
        let org = OrgId::new();
        assert!(!may_transition_trip(&carrier_of(OrgId::new()), &org));
    }

    #[test]
    fn test_shipper_never_transitions_trips() {
        let org = OrgId::new();
        // Even a shipper bound to the trip's own carrier org is refused.
        assert!(!may_transition_trip(&shipper_of(org), &org));
    }

    #[test]
    fn test_elevated_roles_transition_any_trip() {
        let org = OrgId::new();
        for role in [Role::Dispatcher, Role::Admin] {
            let principal = Principal::elevated(PrincipalId::new(), role);
            assert!(may_transition_trip(&principal, &org));
        }
    }

    #[test]
    fn test_shipper_manages_own_loads_only() {
        let org = OrgId::new();
        assert!(may_manage_load(&shipper_of(org), &org));
        assert!(!may_manage_load(&shipper_of(OrgId::new()), &org));
        assert!(!may_manage_load(&carrier_of(org), &org));
    }

    #[test]
    fn test_pod_capabilities_split_by_side() {
        let carrier_org = OrgId::new();
        let shipper_org = OrgId::new();
        let carrier = carrier_of(carrier_org);
        let shipper = shipper_of(shipper_org);

        assert!(may_submit_pod(&carrier, &carrier_org));
        assert!(!may_submit_pod(&shipper, &carrier_org));

        assert!(may_verify_pod(&shipper, &shipper_org));
        assert!(!may_verify_pod(&carrier, &shipper_org));
    }
}
