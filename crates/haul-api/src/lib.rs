//! # haul-api — Axum API Service for Haulstack
//!
//! The HTTP boundary of the freight platform. Exposes the load board,
//! truck registry, and the trip lifecycle transition operation; resolves
//! the acting principal from bearer tokens; and applies every accepted
//! transition's side effects atomically through the [`depot::Depot`].
//!
//! ## API Surface
//!
//! | Prefix         | Module             | Domain                       |
//! |----------------|--------------------|------------------------------|
//! | `/v1/loads/*`  | [`routes::loads`]  | Load board, POD, assignment  |
//! | `/v1/trucks/*` | [`routes::trucks`] | Truck registry               |
//! | `/v1/trips/*`  | [`routes::trips`]  | Trip transitions, event log  |
//! | `/health/*`    | (in this module)   | Probes, unauthenticated      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No lifecycle rules in route handlers — validation lives in
//!   haul-state, orchestration in [`depot`].
//! - All errors map to structured HTTP responses via
//!   [`error::AppError`].

pub mod auth;
pub mod depot;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::{AppConfig, AppState};

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = state.config.auth();

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::loads::router())
        .merge(routes::trucks::router())
        .merge(routes::trips::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
