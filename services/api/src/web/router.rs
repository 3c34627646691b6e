//! services/api/src/web/router.rs
//!
//! Assembles the HTTP surface: public pages, the session-guarded pages and
//! JSON endpoints, and the Swagger UI.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    auth, library, middleware::require_auth, preferences, recommendation, rest, rest::ApiDoc,
    state::AppState,
};

/// Builds the full application router around an already-initialized state.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(library::home))
        .route("/health", get(library::health_check))
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/register", get(auth::register_page).post(auth::register_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/logout", get(auth::logout_handler))
        .route(
            "/preferences_and_genres",
            get(preferences::preferences_page).post(preferences::save_preferences),
        )
        .route(
            "/recommendation",
            get(recommendation::recommendation_page).post(recommendation::recommendation_handler),
        )
        .route("/history", get(library::history_page))
        .route("/cart", get(library::cart_page))
        .route("/change_reaction/{id}", get(library::change_reaction))
        .route("/reaction", post(rest::react_handler))
        .route("/delete_reaction", post(rest::delete_reaction_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let app_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state);

    // Merge the app router with the Swagger UI router for a complete application.
    Router::new()
        .merge(app_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
