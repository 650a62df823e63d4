//! Application setup and router assembly.

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::{OtpConfig, OtpManager, OtpSender, TokenService};
use crate::domains::authz::PermissionEvaluator;
use crate::server::middleware::{require_unverified, require_verified};
use crate::server::routes::{comments, health, otp, todos, users};

/// Shared application state
///
/// The rule table inside the evaluator is immutable after this point; all
/// remaining state is the pool and stateless services.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub tokens: Arc<TokenService>,
    pub otp_sender: Arc<dyn OtpSender>,
    pub otp: Arc<OtpManager>,
    pub permissions: Arc<PermissionEvaluator>,
}

/// Build the Axum application router
pub fn build_app(
    pool: PgPool,
    tokens: Arc<TokenService>,
    otp_sender: Arc<dyn OtpSender>,
    otp_config: OtpConfig,
) -> Router {
    let state = AppState {
        db_pool: pool,
        tokens,
        otp_sender,
        otp: Arc::new(OtpManager::new(otp_config)),
        permissions: Arc::new(PermissionEvaluator::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Routes requiring an authenticated, verified user
    let verified_routes = Router::new()
        .route("/me", get(users::me))
        .route("/me/location", put(users::update_location))
        .route("/todos", post(todos::create_todo))
        .route(
            "/todos/:id",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route("/comments", post(comments::create_comment))
        .route(
            "/comments/:id",
            get(comments::get_comment).put(comments::update_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_verified,
        ));

    // OTP endpoints are only reachable before verification
    let unverified_routes = Router::new()
        .route("/request-otp", post(otp::request_otp))
        .route("/verify-otp", post(otp::verify_otp))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_unverified,
        ));

    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/request-reset-otp", post(otp::request_reset_otp))
        .route("/verify-reset-otp", post(otp::verify_reset_otp))
        .route("/reset-password", post(users::reset_password))
        .merge(verified_routes)
        .merge(unverified_routes)
        .route("/health", get(health::health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
