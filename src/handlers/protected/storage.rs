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
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::ServiceError;
use crate::storage::{BucketQuery, StoredFile, UploadFileRequest};

/// POST /api/v1/storage?bucketName= - Upload, returns the descriptor without content
pub async fn upload(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    query: Result<Query<BucketQuery>, QueryRejection>,
    payload: Result<Json<UploadFileRequest>, JsonRejection>,
) -> ApiResult<StoredFile> {
    let Query(bucket) = query?;
    let Json(req) = payload?;
    debug!("user {} uploading {} bytes", identity.member_id, req.bytes.len());
    let file = state.files.upload(bucket.requested(), req).await?;
    Ok(ApiResponse::created(file))
}

/// GET /api/v1/storage?bucketName= - Every file in the bucket, with content
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<BucketQuery>, QueryRejection>,
) -> ApiResult<Vec<StoredFile>> {
    let Query(bucket) = query?;
    match state.files.list(bucket.requested()).await {
        Ok(files) => Ok(ApiResponse::success(files)),
        Err(ServiceError::BucketEmpty(_)) => Ok(ApiResponse::success(Vec::new())),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/storage/:id?bucketName=
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<BucketQuery>, QueryRejection>,
) -> ApiResult<StoredFile> {
    let Path(id) = path?;
    let Query(bucket) = query?;
    let file = state.files.get(bucket.requested(), id).await?;
    Ok(ApiResponse::success(file))
}

/// DELETE /api/v1/storage/:id?bucketName=
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<BucketQuery>, QueryRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    let Query(bucket) = query?;
    debug!("user {} deleting file {}", identity.member_id, id);
    state.files.delete(bucket.requested(), id).await?;
    Ok(ApiResponse::no_content())
}
