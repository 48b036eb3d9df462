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
use crate::database::models::company::{Company, CreateCompanyRequest, UpdateCompanyRequest};
use crate::filter::ListParams;
use crate::middleware::{ApiResponse, ApiResult, Identity};

/// POST /api/v1/companies
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> ApiResult<Company> {
    let Json(req) = payload?;
    debug!("user {} creating company", identity.member_id);
    let company = state.companies.create(req).await?;
    Ok(ApiResponse::created(company))
}

/// GET /api/v1/companies
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<Company>> {
    let Query(params) = query?;
    let companies = state.companies.list(params).await?;
    Ok(ApiResponse::success(companies))
}

/// GET /api/v1/companies/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Company> {
    let Path(id) = path?;
    let company = state.companies.get(id).await?;
    Ok(ApiResponse::success(company))
}

/// PATCH /api/v1/companies/:id - Rename
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> ApiResult<Company> {
    let Path(id) = path?;
    let Json(req) = payload?;
    debug!("user {} renaming company {}", identity.member_id, id);
    let company = state.companies.rename(id, req).await?;
    Ok(ApiResponse::success(company))
}
