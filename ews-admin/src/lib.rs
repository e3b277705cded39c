//! ews-admin library - early-warning SMS administration service
//!
//! Serves the operator UI and the JSON API behind it: member, group,
//! dialect and template management, bulk and individual sends through the
//! SMS gateway, and the message history log.

use axum::Router;
use chrono::{DateTime, Utc};
use ews_common::config::GatewayConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod delivery;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod pagination;
pub mod recipients;

pub use crate::error::{ApiError, ApiResult};

use crate::gateway::HubtelClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Outbound SMS gateway client
    pub gateway: HubtelClient,
    /// `[gateway]` section from TOML (lowest-priority credential tier)
    pub gateway_config: Arc<GatewayConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, gateway_config: GatewayConfig) -> ews_common::Result<Self> {
        let gateway = HubtelClient::new(&gateway_config)
            .map_err(|e| ews_common::Error::Config(format!("Gateway client: {}", e)))?;

        Ok(Self {
            db,
            gateway,
            gateway_config: Arc::new(gateway_config),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML page + script)
        .merge(api::ui_routes())
        // API routes
        .merge(api::dashboard_routes())
        .merge(api::group_routes())
        .merge(api::dialect_routes())
        .merge(api::member_routes())
        .merge(api::template_routes())
        .merge(api::history_routes())
        .merge(api::settings_routes())
        .merge(api::send_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        // The UI may be hosted separately from the API
        .layer(CorsLayer::permissive())
        .with_state(state)
}
