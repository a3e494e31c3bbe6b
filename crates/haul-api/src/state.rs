//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds the [`Depot`] (the record set and
//! side-effect orchestrator) and the startup configuration.

use crate::auth::AuthConfig;
use crate::depot::Depot;

/// Configuration assembled from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to bind (default 8080).
    pub port: u16,
    /// Shared bearer secret; `None` disables authentication
    /// (development mode).
    pub auth_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from `PORT` and `AUTH_TOKEN`.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let auth_token = std::env::var("AUTH_TOKEN").ok();
        Self { port, auth_token }
    }

    /// The auth configuration injected into request extensions.
    pub fn auth(&self) -> AuthConfig {
        AuthConfig {
            token: self.auth_token.clone(),
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Platform records and the transition orchestrator.
    pub depot: Depot,
    /// Startup configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Build state from configuration with an empty depot.
    pub fn new(config: AppConfig) -> Self {
        Self {
            depot: Depot::new(),
            config,
        }
    }
}
