use axum::{middleware, routing::get, Router};
use domain::TransferMapper;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{frontend, health, properties, tenants};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub mapper: Arc<TransferMapper>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
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
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let mapper = Arc::new(TransferMapper::with_name_separator(
        config.mapping.tenant_name_separator.clone(),
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        mapper,
    };

    let property_routes = Router::new()
        .route(
            "/api/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/api/properties/:property_id",
            get(properties::get_property)
                .patch(properties::patch_property)
                .delete(properties::delete_property),
        )
        .route(
            "/api/properties/:property_id/tenants",
            get(tenants::list_tenants).post(tenants::create_tenant),
        )
        .route(
            "/api/properties/:property_id/tenants/:tenant_id",
            get(tenants::get_tenant)
                .patch(tenants::patch_tenant)
                .delete(tenants::delete_tenant),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let mut router = Router::new().merge(public_routes).merge(property_routes);

    if config.frontend.enabled {
        router = router.fallback(frontend::serve_frontend);
    }

    router
        // Global middleware (order matters: bottom layers run first)
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
