//! # Authentication Middleware
//!
//! Bearer token middleware resolving the acting principal for every
//! request.
//!
//! ## Token Format
//!
//! Bearer tokens encode role, organization, and account identity:
//!
//! ```text
//! Bearer {role}:{org_id}:{principal_id}:{secret}   — full format
//! Bearer {secret}                                   — legacy format (admin)
//! ```
//!
//! `org_id` is empty for elevated roles (dispatcher/admin), which are not
//! bound to one organization. `principal_id` may be empty in scripted
//! clients; it then resolves to the nil UUID.
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts`
//! impl and convert it to a domain [`Principal`] for the capability
//! predicates.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use haul_core::{OrgId, Principal, PrincipalId, Role};

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller, available to all route handlers
/// via Axum's `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's account identifier.
    pub id: PrincipalId,
    /// The caller's role on the platform.
    pub role: Role,
    /// The organization the caller acts for. `None` for elevated roles.
    pub org: Option<OrgId>,
}

impl CallerIdentity {
    /// The domain principal for capability checks and audit records.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            org: self.org,
        }
    }

    /// The identity injected when authentication is disabled (development
    /// mode): full administrative access, nil account id.
    fn dev_admin() -> Self {
        Self {
            id: PrincipalId::from(Uuid::nil()),
            role: Role::Admin,
            org: None,
        }
    }
}

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the secret to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// Prevents timing side-channels that could reveal secret length or
/// prefix. When lengths differ, performs a dummy comparison to avoid
/// leaking length information through timing variance.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in format `{role}:{org_id}:{principal_id}:{secret}`
/// or `{secret}` (legacy, treated as admin).
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(4, ':').collect();

    match parts.len() {
        // Legacy format: just the secret.
        1 => {
            if constant_time_token_eq(provided, expected_secret) {
                Ok(CallerIdentity {
                    id: PrincipalId::from(Uuid::nil()),
                    role: Role::Admin,
                    org: None,
                })
            } else {
                Err("invalid bearer token".into())
            }
        }
        // Full format: role:org_id:principal_id:secret (ids may be empty).
        4 => {
            let [role_str, org_str, principal_str, secret] = [parts[0], parts[1], parts[2], parts[3]];

            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role = Role::from_str_token(role_str)
                .ok_or_else(|| format!("unknown role: {role_str}"))?;

            let org = if org_str.is_empty() {
                None
            } else {
                Some(OrgId::from(
                    org_str
                        .parse::<Uuid>()
                        .map_err(|e| format!("invalid org_id: {e}"))?,
                ))
            };

            let id = if principal_str.is_empty() {
                PrincipalId::from(Uuid::nil())
            } else {
                PrincipalId::from(
                    principal_str
                        .parse::<Uuid>()
                        .map_err(|e| format!("invalid principal_id: {e}"))?,
                )
            };

            Ok(CallerIdentity { id, role, org })
        }
        _ => Err(
            "invalid token format — expected {role}:{org_id}:{principal_id}:{secret} or {secret}"
                .into(),
        ),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Extract and validate the Bearer token from the Authorization header.
///
/// Parses the token into a [`CallerIdentity`] and injects it into request
/// extensions for downstream handlers.
///
/// When `AuthConfig.token` is `None`, all requests are allowed with admin
/// identity (auth disabled / development mode).
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) if header_value.starts_with("Bearer ") => {
                    let provided = &header_value[7..];
                    match parse_bearer_token(provided, expected) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(msg) => {
                            tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                            unauthorized_response(&msg)
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            // Auth disabled — inject admin identity for full access.
            request.extensions_mut().insert(CallerIdentity::dev_admin());
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
