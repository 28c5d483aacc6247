//! OpenAPI documentation configuration.
//!
//! This module configures OpenAPI 3.0 specification generation using `utoipa`
//! and backs the Swagger UI served at `/swagger-ui`.

use utoipa::OpenApi;

use crate::api::models::{
    AccountResponse, CreateAccountRequest, HealthResponse, LivenessResponse, MessageResponse,
    PoolSummaryResponse, RandomTokenResponse, SitePoolSummary, TokenCountResponse,
};

/// OpenAPI documentation for the cookiepool API.
///
/// This struct aggregates all documented endpoints and schemas.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "cookiepool API",
        version = "0.1.0",
        description = "REST API for the cookie pool. Serves pooled session tokens and manages the account roster.",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    tags(
        (name = "health", description = "Health check endpoints for monitoring and orchestration"),
        (name = "pool", description = "Read-only token serving endpoints"),
        (name = "accounts", description = "Account roster management endpoints")
    ),
    paths(
        // Health endpoints
        crate::api::routes::health::health_check,
        crate::api::routes::health::readiness_check,
        crate::api::routes::health::liveness_check,
        // Pool endpoints
        crate::api::routes::pool::pool_summary,
        crate::api::routes::pool::random_token,
        crate::api::routes::pool::token_count,
        // Account endpoints
        crate::api::routes::accounts::list_accounts,
        crate::api::routes::accounts::create_account,
        crate::api::routes::accounts::delete_account,
    ),
    components(
        schemas(
            // Health schemas
            HealthResponse,
            LivenessResponse,
            MessageResponse,
            // Error schema
            crate::api::error::ApiErrorResponse,
            // Pool schemas
            PoolSummaryResponse,
            SitePoolSummary,
            RandomTokenResponse,
            TokenCountResponse,
            // Account schemas
            AccountResponse,
            CreateAccountRequest,
        )
    )
)]
pub struct ApiDoc;
