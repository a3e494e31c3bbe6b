//! # Roles and Acting Principals
//!
//! The closed role model for the platform. Every authenticated request
//! resolves to a [`Principal`] — who is acting, in what role, for which
//! organization — before any lifecycle logic runs.
//!
//! ## Design
//!
//! Authorization is decided by capability predicates that match
//! exhaustively on [`Role`], never by comparing role-name strings.
//! Adding a role is a compile error at every capability check until the
//! new variant is handled.

use serde::{Deserialize, Serialize};

use crate::identity::{OrgId, PrincipalId};

/// The four platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Posts loads and verifies proof of delivery. Acts for a shipper
    /// organization; never drives trip-status transitions.
    Shipper,
    /// Runs trips for its own organization's trucks.
    Carrier,
    /// Platform operations staff; may transition any trip.
    Dispatcher,
    /// Full administrative access across organizational boundaries.
    Admin,
}

impl Role {
    /// Return the string representation of this role (token/wire form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shipper => "shipper",
            Self::Carrier => "carrier",
            Self::Dispatcher => "dispatcher",
            Self::Admin => "admin",
        }
    }

    /// Parse a role from its wire form.
    pub fn from_str_token(s: &str) -> Option<Self> {
        match s {
            "shipper" => Some(Self::Shipper),
            "carrier" => Some(Self::Carrier),
            "dispatcher" => Some(Self::Dispatcher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this role acts across organizational boundaries.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Dispatcher | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting principal resolved for a request.
///
/// `org` is `None` for elevated roles, which are not bound to a single
/// organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The principal's account identifier.
    pub id: PrincipalId,
    /// The principal's role.
    pub role: Role,
    /// The organization the principal acts for, if role-bound.
    pub org: Option<OrgId>,
}

impl Principal {
    /// Construct a principal bound to an organization.
    pub fn new(id: PrincipalId, role: Role, org: OrgId) -> Self {
        Self {
            id,
            role,
            org: Some(org),
        }
    }

    /// Construct an elevated principal with no organization binding.
    pub fn elevated(id: PrincipalId, role: Role) -> Self {
        Self {
            id,
            role,
            org: None,
        }
    }

    /// Whether this principal acts for the given organization.
    pub fn acts_for(&self, org: &OrgId) -> bool {
        self.org.as_ref() == Some(org)
    }
}
