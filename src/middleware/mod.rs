pub mod auth;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthError, Identity};
pub use response::{envelope_errors, ApiResponse, ApiResult, Envelope};
