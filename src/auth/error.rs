// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Every failure in the token pipeline ends up as exactly one of these
//! variants. The gate is the only place they are turned into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::ApiError;

/// Authentication error type.
///
/// The `Display` text is the description sent to clients; the payload of
/// [`AuthError::KeySetUnavailable`] is only ever logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is expected.")]
    MissingAuthHeader,
    /// Header value is not exactly `<scheme> <token>`
    #[error("The token received is malformed.")]
    MalformedToken,
    /// Scheme is something other than `bearer`
    #[error("The token type is invalid.")]
    InvalidScheme,
    /// Token header segment could not be decoded
    #[error("Authorization malformed.")]
    UnreadableHeader,
    /// Token header carries no `kid`
    #[error("Authorization malformed.")]
    MissingKeyId,
    /// No key in the published set matches the token's `kid`
    #[error("Unable to find the appropriate key.")]
    NoMatchingKey,
    /// Signature verified but `exp` has passed
    #[error("Token expired.")]
    TokenExpired,
    /// Audience or issuer do not match configuration
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    /// Any other decode or signature failure
    #[error("Unable to parse authentication token.")]
    InvalidToken,
    /// Key-set fetch failed (transport, status, timeout or body)
    #[error("Unable to retrieve signing keys.")]
    KeySetUnavailable(String),
    /// Verified payload has no `permissions` claim
    #[error("Permissions not included in JWT.")]
    MissingPermissions,
    /// Required permission is not granted
    #[error("Permission not found.")]
    Unauthorized,
}

impl AuthError {
    /// Get the machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidScheme => "invalid_token",
            AuthError::UnreadableHeader
            | AuthError::MissingKeyId
            | AuthError::NoMatchingKey
            | AuthError::InvalidToken
            | AuthError::KeySetUnavailable(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::MissingPermissions => "invalid_claims",
            AuthError::Unauthorized => "unauthorized",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidScheme
            | AuthError::UnreadableHeader
            | AuthError::MissingKeyId
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::NoMatchingKey
            | AuthError::InvalidToken
            | AuthError::KeySetUnavailable(_)
            | AuthError::MissingPermissions => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::FORBIDDEN,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(err.status_code(), err.to_string()).with_code(err.error_code())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
