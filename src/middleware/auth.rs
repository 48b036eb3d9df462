use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Validation};
use uuid::Uuid;

use crate::auth::{Claims, VerificationKeys, TOKEN_ALGORITHM};
use crate::error::ApiError;

/// Identity resolved from a verified bearer token, valid for one request
#[derive(Clone, Debug)]
pub struct Identity {
    pub member_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header is missing or empty")]
    MissingHeader,
    #[error("authorization header is not in Bearer format")]
    MalformedHeader,
    #[error("invalid access token: {0}")]
    InvalidToken(String),
    #[error("access token expired")]
    Expired,
    #[error("token verification failed: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        tracing::debug!("request rejected: {}", err);
        match err {
            AuthError::MissingHeader => ApiError::unauthorized("authorization required"),
            AuthError::MalformedHeader | AuthError::InvalidToken(_) => {
                ApiError::unauthorized("invalid access token")
            }
            AuthError::Expired => ApiError::unauthorized("access token expired"),
            AuthError::Internal(msg) => {
                tracing::error!("Token verification error: {}", msg);
                ApiError::internal_server_error("internal server error")
            }
        }
    }
}

/// JWT authentication middleware that validates tokens and injects the caller's identity
pub async fn jwt_auth_middleware(
    State(keys): State<VerificationKeys>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match authenticate(request.headers(), &keys, Utc::now()) {
        Ok(identity) => identity,
        Err(err) => return ApiError::from(err).into_response(),
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Run the header, signature and expiry checks in order.
pub fn authenticate(
    headers: &HeaderMap,
    keys: &VerificationKeys,
    now: DateTime<Utc>,
) -> Result<Identity, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = verify_token(token, keys)?;

    if claims.exp < now.timestamp() {
        return Err(AuthError::Expired);
    }

    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(|| AuthError::InvalidToken("exp out of range".to_string()))?;

    Ok(Identity {
        member_id: claims.sub,
        expires_at,
    })
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = match headers.get(AUTHORIZATION) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(AuthError::MissingHeader),
    };

    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Check signature and structure. Expiry is left to the caller so it can be
/// reported separately.
fn verify_token(token: &str, keys: &VerificationKeys) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.validate_exp = false;
    validation.set_issuer(&[&keys.issuer]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    decode::<Claims>(token, &keys.decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::ExpiredSignature
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AuthError::InvalidToken(e.to_string()),
            _ => AuthError::Internal(e.to_string()),
        })
}
