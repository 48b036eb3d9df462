use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::user::{CreateUserRequest, UpdateUserRequest, User};
use crate::filter::ListParams;
use crate::middleware::{ApiResponse, ApiResult, Identity};

/// POST /api/v1/users - Create a member
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = payload?;
    debug!("user {} creating member", identity.member_id);
    let user = state.users.create(req).await?;
    Ok(ApiResponse::created(user))
}

/// GET /api/v1/users - List members with pagination, sorting and name filter
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<User>> {
    let Query(params) = query?;
    let users = state.users.list(params).await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/v1/users/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    let user = state.users.get(id).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /api/v1/users/:id - Partial update, returns the merged member
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    let Json(req) = payload?;
    debug!("user {} updating member {}", identity.member_id, id);
    let user = state.users.update(id, req).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/users/:id - Soft delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    debug!("user {} deleting member {}", identity.member_id, id);
    state.users.delete(id).await?;
    Ok(ApiResponse::no_content())
}
