pub mod company;
pub mod user;

pub use company::{Company, CreateCompanyRequest, NewCompany, UpdateCompanyRequest};
pub use user::{CreateUserRequest, NewUser, UpdateUserRequest, User, UserChange, UserChangeset};

use thiserror::Error;

/// Request-shape problems detected before any store is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty request")]
    EmptyChangeset,

    #[error("{0} is empty")]
    EmptyField(&'static str),
}

/// Required text fields must be present and non-empty.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}
