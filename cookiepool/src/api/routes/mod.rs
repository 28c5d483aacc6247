//! API route modules.
//!
//! Organizes routes by resource type.

pub mod accounts;
pub mod health;
pub mod pool;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;
use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/pool", pool::router())
        .nest("/api/accounts", accounts::router())
        .nest("/health", health::router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}
