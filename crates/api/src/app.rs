use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, security_headers_middleware, trace_id};
use crate::routes::{export, groups, health, invites, profiles, stats, transactions, ws};
use crate::services::Broadcaster;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub broadcaster: Broadcaster,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    create_app_with_broadcaster(config, pool, Broadcaster::new())
}

/// Build the router around an externally owned [`Broadcaster`], so
/// callers (and tests) can subscribe observers without a WebSocket.
pub fn create_app_with_broadcaster(
    config: Config,
    pool: PgPool,
    broadcaster: Broadcaster,
) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        broadcaster,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Group routes
        .route("/api/groups", post(groups::create_group).get(groups::list_groups))
        .route("/api/groups/:group_id", get(groups::get_group))
        .route("/api/groups/:group_id/members", post(groups::add_member))
        .route("/api/groups/:group_id/balances", get(groups::get_balances))
        .route(
            "/api/groups/:group_id/invites",
            post(invites::create_invite).get(invites::list_invites),
        )
        // Invite routes (:code carries the public code, except for
        // deactivation which addresses the invite by ID)
        .route("/api/invites/:code", get(invites::lookup_invite))
        .route("/api/invites/:code/join", post(invites::join_group))
        .route(
            "/api/invites/:code/deactivate",
            patch(invites::deactivate_invite),
        )
        // Transaction routes
        .route(
            "/api/transactions",
            post(transactions::create_transaction).get(transactions::list_transactions),
        )
        .route(
            "/api/transactions/:id",
            put(transactions::update_transaction).delete(transactions::delete_transaction),
        )
        // Profile routes
        .route("/api/profile", post(profiles::create_profile))
        .route(
            "/api/profile/:id",
            get(profiles::get_profile).patch(profiles::update_profile),
        )
        // Stats and export
        .route("/api/stats/monthly", get(stats::monthly_stats))
        .route("/api/export/report", post(export::export_report))
        // Health probes
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::liveness))
        .route("/api/health/ready", get(health::readiness))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Real-time observer socket
        .route("/ws", get(ws::ws_handler))
        // Middleware stack (bottom layer runs first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
