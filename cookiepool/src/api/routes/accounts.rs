//! Account roster routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{
    AccountFilterParams, AccountResponse, CreateAccountRequest, MessageResponse,
};
use crate::api::server::AppState;
use crate::database::models::AccountDbModel;

/// Create the accounts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts))
        .route("/", post(create_account))
        .route("/{site}/{username}", delete(delete_account))
}

fn account_to_response(account: &AccountDbModel) -> AccountResponse {
    AccountResponse {
        site: account.site.clone(),
        username: account.username.clone(),
        created_at: account.created_at,
    }
}

#[utoipa::path(
    get,
    path = "/api/accounts",
    tag = "accounts",
    params(AccountFilterParams),
    responses(
        (status = 200, description = "Registered accounts, passwords omitted", body = [AccountResponse])
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(filter): Query<AccountFilterParams>,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let accounts = state
        .account_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Account store not available"))?;

    let models = match filter.site.as_deref() {
        Some(site) => accounts.for_site(site).await.map_err(ApiError::from)?,
        None => accounts.all().await.map_err(ApiError::from)?,
    };

    Ok(Json(models.iter().map(account_to_response).collect()))
}

#[utoipa::path(
    post,
    path = "/api/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account registered", body = AccountResponse),
        (status = 409, description = "Account already exists", body = crate::api::error::ApiErrorResponse),
        (status = 422, description = "Validation error", body = crate::api::error::ApiErrorResponse)
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    if request.site.trim().is_empty()
        || request.username.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::validation(
            "site, username and password must be non-empty",
        ));
    }

    let registry = state
        .registry
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Site registry not available"))?;
    if !registry.contains(&request.site) {
        return Err(ApiError::validation(format!(
            "Site '{}' is not registered",
            request.site
        )));
    }

    let accounts = state
        .account_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Account store not available"))?;

    let account = AccountDbModel::new(request.site, request.username, request.password);
    // The primary key arbitrates duplicates, concurrent creates included.
    accounts.create(&account).await.map_err(|e| {
        if e.is_unique_violation() {
            ApiError::conflict("An account with this site and username already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(account_to_response(&account))))
}

#[utoipa::path(
    delete,
    path = "/api/accounts/{site}/{username}",
    tag = "accounts",
    params(
        ("site" = String, Path, description = "Site the account belongs to"),
        ("username" = String, Path, description = "Login name")
    ),
    responses(
        (status = 200, description = "Account removed, with any pooled token", body = MessageResponse),
        (status = 404, description = "No such account", body = crate::api::error::ApiErrorResponse)
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Path((site, username)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let accounts = state
        .account_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Account store not available"))?;
    let cookies = state
        .cookie_repository
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Cookie store not available"))?;

    if accounts
        .get(&site, &username)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found(format!(
            "Account '{}/{}' not found",
            site, username
        )));
    }

    // The token goes first; an account may briefly outlive its token, but a
    // token must never outlive its account.
    cookies
        .delete(&site, &username)
        .await
        .map_err(ApiError::from)?;
    accounts
        .delete(&site, &username)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: format!("Account '{}/{}' removed", site, username),
    }))
}
