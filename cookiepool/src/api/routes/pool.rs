//! Pool serving routes.
//!
//! Serving is read-only: these handlers never write to the store, even
//! when they come across a token the validation loop would evict.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{
    PoolSummaryResponse, RandomTokenResponse, SitePoolSummary, TokenCountResponse,
};
use crate::api::server::AppState;

/// Create the pool router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pool_summary))
        .route("/{site}/random", get(random_token))
        .route("/{site}/count", get(token_count))
}

#[utoipa::path(
    get,
    path = "/api/pool",
    tag = "pool",
    responses(
        (status = 200, description = "Roster and pool counts per registered site", body = PoolSummaryResponse)
    )
)]
pub async fn pool_summary(State(state): State<AppState>) -> ApiResult<Json<PoolSummaryResponse>> {
    let registry = state
        .registry
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Site registry not available"))?;
    let accounts = state
        .account_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Account store not available"))?;
    let cookies = state
        .cookie_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Cookie store not available"))?;

    let mut sites = Vec::with_capacity(registry.sites().len());
    for site in registry.sites() {
        let account_count = accounts
            .count_for_site(&site.name)
            .await
            .map_err(ApiError::from)?;
        let token_count = cookies
            .count_for_site(&site.name)
            .await
            .map_err(ApiError::from)?;
        sites.push(SitePoolSummary {
            site: site.name.clone(),
            accounts: account_count,
            tokens: token_count,
        });
    }

    Ok(Json(PoolSummaryResponse { sites }))
}

#[utoipa::path(
    get,
    path = "/api/pool/{site}/random",
    tag = "pool",
    params(
        ("site" = String, Path, description = "Registered site name")
    ),
    responses(
        (status = 200, description = "A pooled token, or available=false when the pool is empty", body = RandomTokenResponse),
        (status = 404, description = "Site not registered", body = crate::api::error::ApiErrorResponse)
    )
)]
pub async fn random_token(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> ApiResult<Json<RandomTokenResponse>> {
    let registry = state
        .registry
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Site registry not available"))?;
    if !registry.contains(&site) {
        return Err(ApiError::not_found(format!(
            "Site '{}' is not registered",
            site
        )));
    }

    let cookies = state
        .cookie_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Cookie store not available"))?;

    let Some(model) = cookies.random_for_site(&site).await.map_err(ApiError::from)? else {
        return Ok(Json(RandomTokenResponse::empty(site)));
    };

    let entry = model.to_entry().map_err(ApiError::from)?;
    Ok(Json(RandomTokenResponse {
        site,
        available: true,
        username: Some(entry.username),
        cookies: Some(entry.payload),
        captured_at: Some(entry.captured_at),
    }))
}

#[utoipa::path(
    get,
    path = "/api/pool/{site}/count",
    tag = "pool",
    params(
        ("site" = String, Path, description = "Registered site name")
    ),
    responses(
        (status = 200, description = "Pool size for the site", body = TokenCountResponse),
        (status = 404, description = "Site not registered", body = crate::api::error::ApiErrorResponse)
    )
)]
pub async fn token_count(
    State(state): State<AppState>,
    Path(site): Path<String>,
) -> ApiResult<Json<TokenCountResponse>> {
    let registry = state
        .registry
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Site registry not available"))?;
    if !registry.contains(&site) {
        return Err(ApiError::not_found(format!(
            "Site '{}' is not registered",
            site
        )));
    }

    let cookies = state
        .cookie_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Cookie store not available"))?;

    let count = cookies.count_for_site(&site).await.map_err(ApiError::from)?;
    Ok(Json(TokenCountResponse { site, count }))
}
