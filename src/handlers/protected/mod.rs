// handlers/protected/mod.rs - bearer token required
//
// Every handler here sits behind `jwt_auth_middleware`, which has already
// inserted the caller's `Identity` into the request extensions.
pub mod companies;
pub mod storage;
pub mod users;
