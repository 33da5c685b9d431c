use super::{auth::middleware::require_api_key, handlers, state::AppState};
use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Creates the Axum router with all the application routes.
///
/// Authentication wraps the routes and the fallback, so unknown paths still
/// require a key. The CORS headers sit outside it and are therefore present on
/// every response, `401` included.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/databases",
            get(handlers::list_databases_handler).options(handlers::preflight_handler),
        )
        .route(
            "/tables",
            get(handlers::list_tables_handler).options(handlers::preflight_handler),
        )
        .route(
            "/schema",
            get(handlers::describe_schema_handler).options(handlers::preflight_handler),
        )
        .route(
            "/data",
            get(handlers::fetch_data_handler).options(handlers::preflight_handler),
        )
        .route(
            "/query",
            post(handlers::run_query_handler).options(handlers::preflight_handler),
        )
        .fallback(handlers::not_found_handler)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_api_key,
        ))
        .with_state(app_state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
        .layer(TraceLayer::new_for_http())
}
