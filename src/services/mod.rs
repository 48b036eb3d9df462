pub mod company_service;
pub mod file_service;
pub mod user_service;

pub use company_service::CompanyService;
pub use file_service::FileService;
pub use user_service::UserService;

use thiserror::Error;

use crate::database::models::ValidationError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::storage::StorageError;

/// Outcome categories shared by every service. Lower-layer errors that have
/// no business meaning are carried through untouched for logging.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    ValidationFailed {
        field: &'static str,
        message: String,
    },

    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} not found")]
    ReferenceNotFound(&'static str),

    #[error("empty request")]
    EmptyChangeset,

    #[error("{0}")]
    InvalidParams(String),

    #[error("bucket {0} is empty")]
    BucketEmpty(String),

    #[error("storage timeout")]
    Timeout,

    #[error(transparent)]
    Database(DatabaseError),

    #[error(transparent)]
    Storage(StorageError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::ValidationFailed {
            field,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyChangeset => ServiceError::EmptyChangeset,
            ValidationError::EmptyField(field) => ServiceError::validation(field, err.to_string()),
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => ServiceError::NotFound(what),
            DatabaseError::Duplicate(what) => ServiceError::Duplicate(what),
            DatabaseError::ReferenceNotFound(what) => ServiceError::ReferenceNotFound(what),
            other => ServiceError::Database(other),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ServiceError::NotFound("file"),
            StorageError::BucketEmpty(bucket) => ServiceError::BucketEmpty(bucket),
            StorageError::InvalidBucket(_) => ServiceError::validation("bucketName", err.to_string()),
            StorageError::Timeout => ServiceError::Timeout,
            other => ServiceError::Storage(other),
        }
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        ServiceError::InvalidParams(err.to_string())
    }
}
